//! Compiler doubles for pipeline and lifecycle tests.

use std::collections::VecDeque;
use std::path::Path;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{Compiled, ScriptCompiler, ScriptOptions, StyleCompiler, StyleOptions};
use crate::core::{Failure, Stage};
use crate::signal::{Signal, SignalResult};

fn settle(result: &SignalResult<Compiled>) -> Signal<Compiled> {
    match result {
        Ok(compiled) => Signal::resolved(compiled.clone()),
        Err(failure) => Signal::failed(failure.clone()),
    }
}

/// Script compiler returning the same result for every call.
pub struct FixedScript(pub SignalResult<Compiled>);

impl FixedScript {
    pub fn ok(code: &str) -> Self {
        Self(Ok(Compiled::new(code)))
    }

    pub fn fail(message: &str) -> Self {
        Self(Err(Failure::error(Stage::Script, message)))
    }
}

impl ScriptCompiler for FixedScript {
    fn name(&self) -> &str {
        "fixed"
    }

    fn compile(&self, _: &Path, _: &ScriptOptions, _: CancellationToken) -> Signal<Compiled> {
        settle(&self.0)
    }
}

/// Script compiler handing out prepared signals, one per call.
#[derive(Default)]
pub struct QueuedScript {
    queue: Mutex<VecDeque<Signal<Compiled>>>,
}

impl QueuedScript {
    pub fn new(signals: impl IntoIterator<Item = Signal<Compiled>>) -> Self {
        Self {
            queue: Mutex::new(signals.into_iter().collect()),
        }
    }
}

impl ScriptCompiler for QueuedScript {
    fn name(&self) -> &str {
        "queued"
    }

    fn compile(&self, _: &Path, _: &ScriptOptions, _: CancellationToken) -> Signal<Compiled> {
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| Signal::failed(Failure::error(Stage::Script, "no prepared result")))
    }
}

/// Style compiler passing the stylesheet through untouched.
pub struct EchoStyle;

impl StyleCompiler for EchoStyle {
    fn name(&self) -> &str {
        "echo"
    }

    fn compile(
        &self,
        source: String,
        _: &Path,
        _: &StyleOptions,
        _: CancellationToken,
    ) -> Signal<Compiled> {
        Signal::resolved(Compiled::new(source))
    }
}

/// Style compiler that always fails.
pub struct FailingStyle(pub &'static str);

impl StyleCompiler for FailingStyle {
    fn name(&self) -> &str {
        "failing"
    }

    fn compile(
        &self,
        _: String,
        _: &Path,
        _: &StyleOptions,
        _: CancellationToken,
    ) -> Signal<Compiled> {
        Signal::failed(Failure::error(Stage::Style, self.0))
    }
}
