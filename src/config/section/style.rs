//! `[style]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [style]
//! advanced = true             # Structural optimizations (rule merging)
//! minify = true               # Default: on in production
//! command = ["sass", "--stdin"]  # External compiler: stdin -> stdout
//! ```

use serde::{Deserialize, Serialize};

use crate::compiler::StyleOptions;
use crate::core::RunMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSectionConfig {
    pub advanced: bool,
    pub minify: Option<bool>,
    pub command: Vec<String>,
}

impl Default for StyleSectionConfig {
    fn default() -> Self {
        Self {
            advanced: true,
            minify: None,
            command: Vec::new(),
        }
    }
}

impl StyleSectionConfig {
    pub fn options(&self, mode: RunMode) -> StyleOptions {
        StyleOptions {
            minify: self.minify.unwrap_or(!mode.is_dev()),
            advanced: self.advanced,
        }
    }
}
