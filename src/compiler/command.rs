//! External compiler commands.
//!
//! A configured argv (e.g. `["esbuild", "$KILN_ENTRY", "--bundle"]`) gets its
//! `$KILN_*` variables substituted, and the same variables are exported to
//! the child's environment. Stdout is the compiled output; stderr is split
//! into diagnostics.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use rustc_hash::FxHashMap;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::{Compiled, ScriptCompiler, ScriptOptions, StyleCompiler, StyleOptions};
use crate::core::{ErrorRecord, Failure, Stage};
use crate::signal::{Signal, SignalResult};

/// Script compiler backed by an external process.
pub struct CommandScript {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl CommandScript {
    pub fn new(argv: Vec<String>, cwd: PathBuf) -> Self {
        Self { argv, cwd }
    }
}

impl ScriptCompiler for CommandScript {
    fn name(&self) -> &str {
        self.argv.first().map_or("command", String::as_str)
    }

    fn compile(
        &self,
        entry: &Path,
        options: &ScriptOptions,
        token: CancellationToken,
    ) -> Signal<Compiled> {
        let vars = script_vars(entry, options);
        let job = Job {
            argv: resolve_args(&self.argv, &vars),
            vars,
            cwd: self.cwd.clone(),
            input: None,
            stage: Stage::Script,
        };
        Signal::from_future(job.run(token))
    }
}

/// Style compiler backed by an external process reading stdin.
pub struct CommandStyle {
    argv: Vec<String>,
    cwd: PathBuf,
}

impl CommandStyle {
    pub fn new(argv: Vec<String>, cwd: PathBuf) -> Self {
        Self { argv, cwd }
    }
}

impl StyleCompiler for CommandStyle {
    fn name(&self) -> &str {
        self.argv.first().map_or("command", String::as_str)
    }

    fn compile(
        &self,
        source: String,
        origin: &Path,
        options: &StyleOptions,
        token: CancellationToken,
    ) -> Signal<Compiled> {
        let vars = style_vars(origin, options);
        let job = Job {
            argv: resolve_args(&self.argv, &vars),
            vars,
            cwd: self.cwd.clone(),
            input: Some(source),
            stage: Stage::Style,
        };
        Signal::from_future(job.run(token))
    }
}

// ============================================================================
// Variables
// ============================================================================

fn script_vars(entry: &Path, options: &ScriptOptions) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert("KILN_ENTRY".into(), entry.display().to_string());
    vars.insert("KILN_TARGET".into(), options.target.clone());
    vars.insert("KILN_FORMAT".into(), options.format.label().into());
    vars.insert("KILN_MINIFY".into(), options.minify.to_string());
    vars.insert("KILN_SOURCEMAP".into(), options.source_map.to_string());
    vars.insert("KILN_KEEP_NAMES".into(), options.keep_names.to_string());
    vars.insert("KILN_OPTIMIZATION".into(), options.optimization.label().into());
    vars
}

fn style_vars(origin: &Path, options: &StyleOptions) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert("KILN_INPUT".into(), origin.display().to_string());
    vars.insert("KILN_MINIFY".into(), options.minify.to_string());
    vars.insert("KILN_ADVANCED".into(), options.advanced.to_string());
    vars
}

/// Replace `$KILN_*` occurrences in each argument.
///
/// Longer names are substituted first so `$KILN_MINIFY` never eats a prefix
/// of a longer variable.
pub fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    let mut keys: Vec<_> = vars.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

    args.iter()
        .map(|arg| {
            let mut result = arg.clone();
            for key in &keys {
                result = result.replace(&format!("${key}"), &vars[*key]);
            }
            result
        })
        .collect()
}

// ============================================================================
// Execution
// ============================================================================

struct Job {
    argv: Vec<String>,
    vars: FxHashMap<String, String>,
    cwd: PathBuf,
    input: Option<String>,
    stage: Stage,
}

impl Job {
    async fn run(self, token: CancellationToken) -> SignalResult<Compiled> {
        let stage = self.stage;
        let Some((program, args)) = self.argv.split_first() else {
            return Err(Failure::error(stage, "compiler command is empty"));
        };
        if token.is_cancelled() {
            return Err(Failure::superseded(stage));
        }

        let mut command = Command::new(program);
        command
            .args(args)
            .envs(&self.vars)
            .current_dir(&self.cwd)
            .stdin(if self.input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        crate::debug!("exec"; "{}", self.argv.join(" "));
        let mut child = command
            .spawn()
            .map_err(|e| Failure::error(stage, format!("failed to run `{program}`: {e}")))?;

        let stdin = child.stdin.take();
        let input = self.input;
        let feed = async move {
            if let (Some(mut pipe), Some(text)) = (stdin, input) {
                pipe.write_all(text.as_bytes()).await?;
                pipe.shutdown().await?;
            }
            Ok::<(), std::io::Error>(())
        };
        let finish = async move { tokio::join!(feed, child.wait_with_output()) };

        // Dropping `finish` drops the child, which kills it.
        let (fed, output) = tokio::select! {
            biased;
            () = token.cancelled() => {
                crate::debug!("exec"; "killed `{program}`: superseded");
                return Err(Failure::superseded(stage));
            }
            done = finish => done,
        };

        let output =
            output.map_err(|e| Failure::error(stage, format!("`{program}` failed: {e}")))?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let success = output.status.success();
        let mut records = parse_diagnostics(&stderr, stage, success);

        if !success {
            if !records.iter().any(ErrorRecord::is_error) {
                records.push(ErrorRecord::error(
                    stage,
                    format!("`{program}` exited with {}", output.status),
                ));
            }
            return Err(Failure::from_records(records));
        }
        if let Err(e) = fed {
            return Err(Failure::error(stage, format!("cannot write to `{program}`: {e}")));
        }

        let code = String::from_utf8(output.stdout)
            .map_err(|_| Failure::error(stage, format!("`{program}` wrote non UTF-8 output")))?;
        Ok(Compiled::new(code).with_warnings(records))
    }
}

/// Split stderr into blank-line separated blocks, one record each.
///
/// On success every block is advisory. On failure a block is a warning only
/// if its first line says so.
pub fn parse_diagnostics(stderr: &str, stage: Stage, success: bool) -> Vec<ErrorRecord> {
    let normalized = stderr.replace("\r\n", "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(|block| {
            let first = block.lines().next().unwrap_or_default().to_ascii_lowercase();
            if success || first.contains("warning") {
                ErrorRecord::warning(stage, block)
            } else {
                ErrorRecord::error(stage, block)
            }
        })
        .collect()
}
