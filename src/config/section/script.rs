//! `[script]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [script]
//! target = "es2020"           # Target environment
//! format = "iife"             # esm | iife
//! minify = true               # Default: on in production
//! source_map = false          # Default: on in development
//! keep_names = false          # Default: on in development
//! optimization = "safest"     # smallest | safest | none
//! command = ["esbuild", "$KILN_ENTRY", "--bundle"]  # External bundler
//! ```

use serde::{Deserialize, Serialize};

use crate::compiler::{ModuleFormat, Optimization, ScriptOptions};
use crate::core::RunMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSectionConfig {
    pub target: String,
    pub format: ModuleFormat,
    pub minify: Option<bool>,
    pub source_map: Option<bool>,
    pub keep_names: Option<bool>,
    pub optimization: Optimization,
    /// External bundler argv. Empty uses the built-in compiler.
    pub command: Vec<String>,
}

impl Default for ScriptSectionConfig {
    fn default() -> Self {
        Self {
            target: "esnext".into(),
            format: ModuleFormat::Esm,
            minify: None,
            source_map: None,
            keep_names: None,
            optimization: Optimization::Smallest,
            command: Vec::new(),
        }
    }
}

impl ScriptSectionConfig {
    /// Options for one build, filling unset toggles from the run mode.
    pub fn options(&self, mode: RunMode) -> ScriptOptions {
        let dev = mode.is_dev();
        ScriptOptions {
            target: self.target.clone(),
            format: self.format,
            minify: self.minify.unwrap_or(!dev),
            source_map: self.source_map.unwrap_or(dev),
            keep_names: self.keep_names.unwrap_or(dev),
            optimization: self.optimization,
        }
    }
}
