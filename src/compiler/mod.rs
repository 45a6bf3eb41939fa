//! External compiler collaborators.
//!
//! The build pipeline only depends on the two contracts below. Adapters:
//!
//! | Adapter         | Contract         | Backend                          |
//! |-----------------|------------------|----------------------------------|
//! | `OxcScript`     | `ScriptCompiler` | oxc parser, minifier, codegen    |
//! | `LightningStyle`| `StyleCompiler`  | lightningcss                     |
//! | `CommandScript` | `ScriptCompiler` | external process (e.g. esbuild)  |
//! | `CommandStyle`  | `StyleCompiler`  | external process (stdin → stdout)|
//!
//! Every call receives the run's cancellation token. In-process adapters
//! discard their result once the token is stale; command adapters kill the
//! child process.

pub mod command;
pub mod options;
pub mod script;
pub mod style;

#[cfg(test)]
pub mod testing;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::KilnConfig;
use crate::core::{ErrorRecord, Failure, Stage};
use crate::signal::{Signal, SignalResult};

pub use command::{CommandScript, CommandStyle};
pub use options::{ModuleFormat, Optimization, ScriptOptions, StyleOptions};
pub use script::OxcScript;
pub use style::LightningStyle;

/// Compiler output plus advisory diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compiled {
    pub code: String,
    pub warnings: Vec<ErrorRecord>,
}

impl Compiled {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<ErrorRecord>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// Bundles the script entry module into a single piece of code.
pub trait ScriptCompiler: Send + Sync {
    /// Adapter name for logs.
    fn name(&self) -> &str;

    fn compile(
        &self,
        entry: &Path,
        options: &ScriptOptions,
        token: CancellationToken,
    ) -> Signal<Compiled>;
}

/// Compiles stylesheet text into CSS.
pub trait StyleCompiler: Send + Sync {
    /// Adapter name for logs.
    fn name(&self) -> &str;

    fn compile(
        &self,
        source: String,
        origin: &Path,
        options: &StyleOptions,
        token: CancellationToken,
    ) -> Signal<Compiled>;
}

/// The pair of collaborators one build uses.
#[derive(Clone)]
pub struct Compilers {
    pub script: Arc<dyn ScriptCompiler>,
    pub style: Arc<dyn StyleCompiler>,
}

impl Compilers {
    pub fn new(script: impl ScriptCompiler + 'static, style: impl StyleCompiler + 'static) -> Self {
        Self {
            script: Arc::new(script),
            style: Arc::new(style),
        }
    }

    /// In-process oxc + lightningcss.
    pub fn builtin() -> Self {
        Self::new(OxcScript, LightningStyle)
    }

    /// Built-in adapters unless a command is configured.
    pub fn from_config(config: &KilnConfig) -> Self {
        let root = config.root.clone();

        let script: Arc<dyn ScriptCompiler> = if config.script.command.is_empty() {
            Arc::new(OxcScript)
        } else {
            Arc::new(CommandScript::new(config.script.command.clone(), root.clone()))
        };
        let style: Arc<dyn StyleCompiler> = if config.style.command.is_empty() {
            Arc::new(LightningStyle)
        } else {
            Arc::new(CommandStyle::new(config.style.command.clone(), root))
        };

        crate::debug!("compiler"; "script: {}, style: {}", script.name(), style.name());
        Self { script, style }
    }
}

/// Run synchronous compiler work on the blocking pool.
///
/// A stale token settles the signal immediately; the blocking work may still
/// finish in the background but its result is dropped.
pub(crate) fn spawn_compile<F>(stage: Stage, token: CancellationToken, work: F) -> Signal<Compiled>
where
    F: FnOnce() -> SignalResult<Compiled> + Send + 'static,
{
    Signal::from_future(async move {
        if token.is_cancelled() {
            return Err(Failure::superseded(stage));
        }

        tokio::select! {
            biased;
            () = token.cancelled() => Err(Failure::superseded(stage)),
            joined = tokio::task::spawn_blocking(work) => joined.map_err(|e| {
                Failure::error(stage, format!("compiler task failed: {e}"))
            })?,
        }
    })
}
