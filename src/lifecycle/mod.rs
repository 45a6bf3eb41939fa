//! Lifecycle controller: one build, or a build on every change.
//!
//! ```text
//! Idle ──run()──▶ Running ──▶ Terminated(status)
//!                   │  ▲
//!                   └──┘ continuous: trigger → build → persist → report
//! ```
//!
//! The mode is read once from configuration at construction. Both modes
//! start with an immediate synthetic trigger; one-shot mode stops after the
//! first result, continuous mode only stops on shutdown.


use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use futures::{Stream, StreamExt, future, stream};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::compiler::Compilers;
use crate::config::KilnConfig;
use crate::core::{RunMode, Trigger};
use crate::logger::{self, format_failure, report_failure, report_warnings};
use crate::pipeline::{Built, Pipeline};
use crate::signal::{SignalResult, switch_latest};
use crate::watch::observe_changes;
use crate::{debug, log};

/// Terminal status of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Terminated(ExitStatus),
}

/// What a finished controller did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Runs that wrote an artifact.
    pub builds: u64,
    /// Failed runs and watch failures.
    pub failures: u64,
    pub status: ExitStatus,
}

impl Summary {
    pub fn exit_code(&self) -> ExitCode {
        match self.status {
            ExitStatus::Success => ExitCode::SUCCESS,
            ExitStatus::Failed => ExitCode::FAILURE,
        }
    }
}

pub struct Controller {
    mode: RunMode,
    pipeline: Pipeline,
    /// Watched source tree (continuous mode)
    src: PathBuf,
    window: Duration,
    fail_on_error: bool,
    shutdown: Option<UnboundedReceiver<()>>,
    phase: Phase,
    builds: u64,
    failures: u64,
}

impl Controller {
    /// Controller with the compilers selected by configuration.
    pub fn new(config: &KilnConfig) -> Self {
        Self::with_compilers(config, Compilers::from_config(config))
    }

    pub fn with_compilers(config: &KilnConfig, compilers: Compilers) -> Self {
        Self {
            mode: config.mode,
            pipeline: Pipeline::new(config.build_settings(), compilers),
            src: config.src_dir(),
            window: config.watch.window(),
            fail_on_error: config.build.fail_on_error,
            shutdown: None,
            phase: Phase::Idle,
            builds: 0,
            failures: 0,
        }
    }

    /// Set shutdown signal receiver
    pub fn with_shutdown_signal(mut self, rx: UnboundedReceiver<()>) -> Self {
        self.shutdown = Some(rx);
        self
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Run until the mode says stop.
    pub async fn run(mut self) -> Result<Summary> {
        let initial = stream::once(future::ready(Ok(Trigger)));

        if self.mode.is_continuous() {
            let changes = observe_changes(&self.src, self.window)?;
            log!("watch"; "watching {} for changes", self.src.display());
            Ok(self.drive(initial.chain(changes)).await)
        } else {
            Ok(self.drive(initial).await)
        }
    }

    /// Feed `triggers` through switch-latest builds and report every result.
    pub(crate) async fn drive<S>(&mut self, triggers: S) -> Summary
    where
        S: Stream<Item = SignalResult<Trigger>> + Unpin,
    {
        self.phase = Phase::Running;
        debug!("dev"; "{} mode", self.mode.label());

        let pipeline = self.pipeline.clone();
        let mut builds = switch_latest(triggers, move |ctx| pipeline.run(ctx));
        let mut shutdown = self.shutdown.take();

        let status = loop {
            let next = match shutdown.as_mut() {
                Some(rx) => tokio::select! {
                    biased;
                    Some(()) = rx.recv() => {
                        log!("dev"; "shutting down");
                        break ExitStatus::Success;
                    }
                    next = builds.next() => next,
                },
                None => builds.next().await,
            };

            let Some(result) = next else {
                debug!("dev"; "trigger stream ended");
                break self.final_status();
            };
            self.report(result);

            if !self.mode.is_continuous() {
                break self.final_status();
            }
        };

        // Drops the trigger stream, and with it the filesystem watch.
        drop(builds);
        self.phase = Phase::Terminated(status);

        Summary {
            builds: self.builds,
            failures: self.failures,
            status,
        }
    }

    fn final_status(&self) -> ExitStatus {
        if self.failures > 0 && self.fail_on_error && !self.mode.is_continuous() {
            ExitStatus::Failed
        } else {
            ExitStatus::Success
        }
    }

    fn report(&mut self, result: SignalResult<Built>) {
        match result {
            Ok(built) => {
                self.builds += 1;
                report_warnings(&built.warnings);

                let message = format!("wrote {} ({} bytes)", built.output.display(), built.bytes);
                if self.mode.is_dev() {
                    logger::status_success(&message);
                } else {
                    log!("build"; "{}", message);
                }
            }
            Err(failure) => {
                self.failures += 1;
                let summary = format!("build failed ({} errors)", failure.error_count());
                if self.mode.is_dev() {
                    logger::status_error(&summary, &format_failure(&failure));
                } else {
                    report_failure(&failure);
                    log!("error"; "{}", summary);
                }
            }
        }
    }
}
