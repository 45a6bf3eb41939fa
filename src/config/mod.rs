//! Project configuration management for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build], [script], [style], [watch]
//! ├── error          # ConfigError
//! ├── util           # config file discovery
//! └── mod.rs         # KilnConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section    | Purpose                                            |
//! |------------|----------------------------------------------------|
//! | `[build]`  | Source/output layout, title, failure policy        |
//! | `[script]` | Script target, format, minification, bundler argv  |
//! | `[style]`  | Stylesheet optimization, compiler argv             |
//! | `[watch]`  | Change coalescing window                           |
//!
//! The file is optional: without one every section takes its defaults and
//! the project root is the current directory.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{
    BuildSectionConfig, ScriptSectionConfig, StyleSectionConfig, WatchSectionConfig,
};

use util::find_config_file;

use crate::cli::Cli;
use crate::core::RunMode;
use crate::pipeline::{BuildPaths, BuildSettings};
use crate::utils::path::normalize_path;
use crate::{debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Project root directory (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Run mode, fixed at startup (internal use only)
    #[serde(skip)]
    pub mode: RunMode,

    #[serde(default)]
    pub build: BuildSectionConfig,

    #[serde(default)]
    pub script: ScriptSectionConfig,

    #[serde(default)]
    pub style: StyleSectionConfig,

    #[serde(default)]
    pub watch: WatchSectionConfig,
}

impl KilnConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when there is none.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                debug!("config"; "using {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map_or_else(|| cwd.clone(), Path::to_path_buf);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        for field in &ignored {
            log!("warning"; "unknown field `{}` in {} ignored", field, path.display());
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        self.mode = cli.mode;
        if let Some(src) = &cli.src {
            self.build.src = src.clone();
        }
        if let Some(dist) = &cli.dist {
            self.build.dist = dist.clone();
        }
    }

    /// Validate the final configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let src = self.src_dir();
        if !src.is_dir() {
            return Err(ConfigError::Validation(format!(
                "source directory `{}` does not exist",
                src.display()
            )));
        }

        let dist = self.dist_dir();
        if dist.starts_with(&src) || normalize_path(&dist).starts_with(normalize_path(&src)) {
            return Err(ConfigError::Validation(format!(
                "output directory `{}` must not be inside the source directory `{}`",
                dist.display(),
                src.display()
            )));
        }

        for (section, command) in [("script", &self.script.command), ("style", &self.style.command)] {
            if command.first().is_some_and(|program| program.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "[{section}].command has an empty program name"
                )));
            }
        }

        if self.build.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation("[build].output is empty".into()));
        }
        Ok(())
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        crate::utils::path::resolve_path(path.as_ref(), &self.root)
    }

    /// Absolute source directory (the watched tree).
    pub fn src_dir(&self) -> PathBuf {
        self.root_join(&self.build.src)
    }

    /// Absolute output directory.
    pub fn dist_dir(&self) -> PathBuf {
        self.root_join(&self.build.dist)
    }

    /// Resolved input and output locations of one build.
    pub fn paths(&self) -> BuildPaths {
        let src = self.src_dir();
        BuildPaths {
            template: src.join(&self.build.template),
            script: src.join(&self.build.script),
            style: src.join(&self.build.style),
            output: self.dist_dir().join(&self.build.output),
        }
    }

    /// Everything the pipeline needs for one build in the current mode.
    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            paths: self.paths(),
            title: self.build.title.clone(),
            script: self.script.options(self.mode),
            style: self.style.options(self.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ModuleFormat;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kiln").chain(args.iter().copied())).unwrap()
    }

    fn config_in(dir: &TempDir, content: &str) -> KilnConfig {
        let mut config = KilnConfig::from_str(content).unwrap();
        config.root = dir.path().to_path_buf();
        config
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = KilnConfig::from_str("").unwrap();
        assert_eq!(config.build, BuildSectionConfig::default());
        assert_eq!(config.watch.debounce_ms, 0);
        assert!(config.style.advanced);
        assert!(config.script.command.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = KilnConfig::from_str(
            r#"
            [build]
            src = "app"
            title = "Demo"

            [script]
            format = "iife"
            command = ["esbuild", "$KILN_ENTRY"]

            [style]
            advanced = false

            [watch]
            debounce_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.build.src, PathBuf::from("app"));
        assert_eq!(config.build.title, "Demo");
        assert_eq!(config.script.format, ModuleFormat::Iife);
        assert_eq!(config.script.command, vec!["esbuild", "$KILN_ENTRY"]);
        assert!(!config.style.advanced);
        assert_eq!(config.watch.window(), std::time::Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_toml() {
        let err = KilnConfig::from_str("[build\nsrc = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));

        let err = KilnConfig::from_str("[script]\nformat = \"umd\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            KilnConfig::parse_with_ignored("[build]\ntitle = \"x\"\nflavour = 1\n").unwrap();
        assert_eq!(config.build.title, "x");
        assert_eq!(ignored, vec!["build.flavour"]);
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "");
        let paths = config.paths();

        assert_eq!(paths.template, dir.path().join("src/main.html"));
        assert_eq!(paths.script, dir.path().join("src/main.js"));
        assert_eq!(paths.style, dir.path().join("src/main.css"));
        assert_eq!(paths.output, dir.path().join("dist/main.html"));
    }

    #[test]
    fn test_cli_overrides() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir, "[build]\nsrc = \"app\"\n");
        config.apply_cli(&cli(&["--mode", "dev", "--src", "web", "--dist", "out"]));

        assert_eq!(config.mode, RunMode::Development);
        assert_eq!(config.src_dir(), dir.path().join("web"));
        assert_eq!(config.dist_dir(), dir.path().join("out"));
        assert!(config.build_settings().script.source_map);
    }

    #[test]
    fn test_validate() {
        let dir = TempDir::new().unwrap();
        let config = config_in(&dir, "");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        std::fs::create_dir(dir.path().join("src")).unwrap();
        assert!(config.validate().is_ok());

        let config = config_in(&dir, "[style]\ncommand = [\"\"]\n");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validate_rejects_dist_inside_src() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/out")).unwrap();

        for dist in ["src/out", "src", "src/nested/deeper"] {
            let config = config_in(&dir, &format!("[build]\ndist = \"{dist}\"\n"));
            let err = config.validate().unwrap_err();
            assert!(err.to_string().contains("inside the source directory"), "{dist}: {err}");
        }

        let config = config_in(&dir, "[build]\ndist = \"srcdist\"\n");
        assert!(config.validate().is_ok());
    }
}
