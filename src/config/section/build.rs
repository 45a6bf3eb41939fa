//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "src"                 # Source directory (relative to project root)
//! dist = "dist"               # Output directory (relative to project root)
//! template = "main.html"      # HTML template (relative to src)
//! script = "main.js"          # Script entry module (relative to src)
//! style = "main.css"          # Stylesheet (relative to src)
//! output = "main.html"        # Artifact file name (relative to dist)
//! title = "My Application"    # Substituted for the TITLE placeholder
//! fail_on_error = true        # Exit non-zero when a one-shot build fails
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    pub src: PathBuf,
    pub dist: PathBuf,
    pub template: PathBuf,
    pub script: PathBuf,
    pub style: PathBuf,
    pub output: PathBuf,
    pub title: String,
    pub fail_on_error: bool,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            src: "src".into(),
            dist: "dist".into(),
            template: "main.html".into(),
            script: "main.js".into(),
            style: "main.css".into(),
            output: "main.html".into(),
            title: "My Application".into(),
            fail_on_error: true,
        }
    }
}
