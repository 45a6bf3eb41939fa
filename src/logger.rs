//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `debug!` macro, shown only with `--verbose`
//! - `WatchStatus` for the development loop's single status block
//! - diagnostic rendering for build failures and warnings (stderr)
//!
//! # Example
//!
//! ```ignore
//! log!("build"; "wrote {}", path.display());
//! status_success("rebuilt dist/main.html");
//! report_failure(&failure);
//! ```

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::{OwoColorize, Stream};
use parking_lot::Mutex;
use std::{
    io::{Write, stderr, stdout},
    sync::LazyLock,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::core::{ErrorRecord, Failure, Severity};

/// Global verbose flag (set by --verbose CLI argument)
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set verbose mode globally
pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

/// Check if verbose mode is enabled
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when --verbose is enabled)
///
/// # Usage
/// ```ignore
/// debug!("module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);

    WATCH_STATUS.lock().detach();
    let mut stdout = stdout().lock();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "dev" => prefix.bright_blue().bold().to_string(),
        "watch" => prefix.bright_green().bold().to_string(),
        "error" => prefix.bright_red().bold().to_string(),
        _ => prefix.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// Diagnostics (stderr)
// ============================================================================

/// Render one record: `error[script]: message`, colored by severity.
pub fn format_record(record: &ErrorRecord) -> String {
    let tag = format!("{}[{}]", record.severity.label(), record.stage);
    let tag = match record.severity {
        Severity::Error => tag
            .if_supports_color(Stream::Stderr, |t| t.bright_red().bold().to_string())
            .to_string(),
        Severity::Warning => tag
            .if_supports_color(Stream::Stderr, |t| t.yellow().bold().to_string())
            .to_string(),
    };
    format!("{tag}: {}", record.message)
}

/// Render every record of a failure, one block per record.
pub fn format_failure(failure: &Failure) -> String {
    failure
        .records()
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write a failure to the diagnostic stream.
pub fn report_failure(failure: &Failure) {
    WATCH_STATUS.lock().detach();
    let mut stderr = stderr().lock();
    writeln!(stderr, "{}", format_failure(failure)).ok();
    stderr.flush().ok();
}

/// Write advisory warnings to the diagnostic stream.
pub fn report_warnings(warnings: &[ErrorRecord]) {
    if warnings.is_empty() {
        return;
    }
    WATCH_STATUS.lock().detach();
    let mut stderr = stderr().lock();
    for warning in warnings {
        writeln!(stderr, "{}", format_record(warning)).ok();
    }
    stderr.flush().ok();
}

// ============================================================================
// Watch Status (single-line status with overwrite)
// ============================================================================

/// Get current time formatted as HH:MM:SS (UTC)
fn now() -> String {
    use std::time::SystemTime;
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[derive(Clone, Copy)]
enum Target {
    Stdout,
    Stderr,
}

/// Single-line status display for the development loop
///
/// Displays status messages that overwrite the previous output,
/// keeping the terminal clean between rebuilds.
///
/// # Example
///
/// ```ignore
/// let mut status = WatchStatus::new();
/// status.success("rebuilt: dist/main.html");
/// status.error("build failed", "error[script]: unexpected token");
/// ```
pub struct WatchStatus {
    /// Lines of previous output to clear
    last_lines: usize,
}

/// Global watch status display shared by the controller and the watcher.
static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::new()));

impl WatchStatus {
    /// Create a new watch status display.
    pub const fn new() -> Self {
        Self { last_lines: 0 }
    }

    /// Display success message (✓ prefix, green).
    pub fn success(&mut self, message: &str) {
        self.display(format!("{}", "✓".green()), message, Target::Stdout);
    }

    /// Display error message (✗ prefix, red) with optional detail.
    pub fn error(&mut self, summary: &str, detail: &str) {
        let message = if detail.is_empty() {
            summary.to_string()
        } else {
            format!("{summary}\n{detail}")
        };
        self.display(format!("{}", "✗".red()), &message, Target::Stderr);
    }

    /// Forget the previous block so the next one does not overwrite output
    /// written in between.
    pub fn detach(&mut self) {
        self.last_lines = 0;
    }

    /// Internal display logic with line overwriting.
    ///
    /// Diagnostics go to stderr, successes to stdout. Both normally share
    /// one terminal, so clearing works across them.
    fn display(&mut self, symbol: String, message: &str, target: Target) {
        let mut out: Box<dyn Write> = match target {
            Target::Stdout => Box::new(stdout().lock()),
            Target::Stderr => Box::new(stderr().lock()),
        };

        if self.last_lines > 0 {
            #[allow(clippy::cast_possible_truncation)]
            let lines = self.last_lines as u16;
            execute!(out, cursor::MoveUp(lines)).ok();
            execute!(out, Clear(ClearType::FromCursorDown)).ok();
        }

        let timestamp = format!("[{}]", now()).dimmed().to_string();
        let line = if symbol.is_empty() {
            format!("{timestamp} {message}")
        } else {
            format!("{timestamp} {symbol} {message}")
        };

        writeln!(out, "{line}").ok();
        out.flush().ok();

        self.last_lines = line_count(message);
    }
}

fn line_count(message: &str) -> usize {
    message.matches('\n').count() + 1
}

/// Global watch status: success
pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

/// Global watch status: error
pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

// ============================================================================
// Tests
// ============================================================================
