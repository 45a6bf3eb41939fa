//! Configuration records accepted by the compiler collaborators.

use serde::{Deserialize, Serialize};

/// Module format of the emitted script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    /// ES module, inlined as `<script type="module">`.
    #[default]
    Esm,
    /// Classic script wrapped in an immediately-invoked function.
    Iife,
}

impl ModuleFormat {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Esm => "esm",
            Self::Iife => "iife",
        }
    }
}

/// Script optimization level used when minifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Optimization {
    /// Most aggressive compression.
    #[default]
    Smallest,
    /// Only transformations that never change semantics.
    Safest,
    /// Whitespace removal and mangling only.
    None,
}

impl Optimization {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Smallest => "smallest",
            Self::Safest => "safest",
            Self::None => "none",
        }
    }
}

/// Options for the script bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOptions {
    /// Target environment (e.g. `esnext`, `es2020`).
    pub target: String,
    pub format: ModuleFormat,
    pub minify: bool,
    pub source_map: bool,
    /// Keep original identifier names (disables mangling).
    pub keep_names: bool,
    pub optimization: Optimization,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            target: "esnext".into(),
            format: ModuleFormat::Esm,
            minify: false,
            source_map: false,
            keep_names: false,
            optimization: Optimization::Smallest,
        }
    }
}

/// Options for the stylesheet compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleOptions {
    pub minify: bool,
    /// Structural optimizations (rule merging, shorthand folding).
    pub advanced: bool,
}
