//! The build pipeline: three concurrent inputs, one inlined artifact.
//!
//! ```text
//! template ──read──────────────────────┐
//! script   ──ScriptCompiler────────────┼─ combine3 ─ render ─ persist
//! style    ──read──StyleCompiler───────┘
//! ```
//!
//! A run produces nothing unless all three inputs succeed; failures of
//! every input are reported together.

mod render;
mod sink;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::compiler::{Compilers, ScriptOptions, StyleOptions};
use crate::core::{ErrorRecord, Failure, Stage};
use crate::signal::{RunContext, Signal, combine3};

pub use render::render_page;
pub use sink::persist;

/// Absolute input and output locations of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPaths {
    pub template: PathBuf,
    pub script: PathBuf,
    pub style: PathBuf,
    pub output: PathBuf,
}

/// Fixed inputs of every run.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub paths: BuildPaths,
    /// Substituted for the `TITLE` placeholder.
    pub title: String,
    pub script: ScriptOptions,
    pub style: StyleOptions,
}

/// Rendered page, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub html: String,
    /// Advisory diagnostics from the compilers and the template.
    pub warnings: Vec<ErrorRecord>,
}

/// Outcome of a persisted run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Built {
    pub output: PathBuf,
    pub bytes: usize,
    pub warnings: Vec<ErrorRecord>,
}

/// Build pipeline shared by every run.
#[derive(Clone)]
pub struct Pipeline {
    settings: Arc<BuildSettings>,
    compilers: Compilers,
}

impl Pipeline {
    pub fn new(settings: BuildSettings, compilers: Compilers) -> Self {
        Self {
            settings: Arc::new(settings),
            compilers,
        }
    }

    /// Read and compile all inputs and render the artifact.
    ///
    /// The three inputs start together and resolve in any order.
    pub fn build(&self, token: CancellationToken) -> Signal<BuildArtifact> {
        let paths = &self.settings.paths;

        let template = read_source(paths.template.clone(), Stage::Template);
        let script = self
            .compilers
            .script
            .compile(&paths.script, &self.settings.script, token.clone());

        let compiler = Arc::clone(&self.compilers.style);
        let origin = paths.style.clone();
        let options = self.settings.style;
        let style = read_source(paths.style.clone(), Stage::Style)
            .flat_map(move |source| compiler.compile(source, &origin, &options, token));

        let settings = Arc::clone(&self.settings);
        combine3(template, script, style, move |template, script, style| {
            render_page(&template, &script, &style, &settings)
        })
    }

    /// One full run: build, then persist unless the run went stale.
    pub fn run(&self, ctx: RunContext) -> Signal<Built> {
        let output = self.settings.paths.output.clone();
        let token = ctx.token;

        self.build(token.clone()).flat_map(move |artifact| {
            let bytes = artifact.html.len();
            let warnings = artifact.warnings;
            persist(output.clone(), artifact.html, token).map(move |()| Built {
                output,
                bytes,
                warnings,
            })
        })
    }
}

/// Read a UTF-8 source file, failing with `stage`.
fn read_source(path: PathBuf, stage: Stage) -> Signal<String> {
    Signal::from_future(async move {
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Failure::error(stage, format!("cannot read {}: {e}", path.display())))
    })
}
