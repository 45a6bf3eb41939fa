//! In-process stylesheet compilation with lightningcss.

use std::path::Path;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use tokio_util::sync::CancellationToken;

use super::{Compiled, StyleCompiler, StyleOptions, spawn_compile};
use crate::core::{Failure, Stage};
use crate::signal::{Signal, SignalResult};

/// Built-in stylesheet compiler.
pub struct LightningStyle;

impl StyleCompiler for LightningStyle {
    fn name(&self) -> &str {
        "lightningcss"
    }

    fn compile(
        &self,
        source: String,
        origin: &Path,
        options: &StyleOptions,
        token: CancellationToken,
    ) -> Signal<Compiled> {
        let origin = origin.to_path_buf();
        let options = *options;
        spawn_compile(Stage::Style, token, move || compile_css(&source, &origin, options))
    }
}

/// Compile one stylesheet. `origin` names the file in diagnostics.
pub fn compile_css(source: &str, origin: &Path, options: StyleOptions) -> SignalResult<Compiled> {
    let fail = |e: &dyn std::fmt::Display| Failure::error(Stage::Style, format!("{}: {e}", origin.display()));

    let parser = ParserOptions {
        filename: origin.display().to_string(),
        ..ParserOptions::default()
    };
    let mut stylesheet = StyleSheet::parse(source, parser).map_err(|e| fail(&e))?;

    if options.advanced {
        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| fail(&e))?;
    }

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: options.minify,
            ..PrinterOptions::default()
        })
        .map_err(|e| fail(&e))?;

    Ok(Compiled::new(result.code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> &'static Path {
        Path::new("src/main.css")
    }

    #[test]
    fn test_compile_minified() {
        let options = StyleOptions {
            minify: true,
            advanced: true,
        };
        let out = compile_css("body { color: red; }", origin(), options).unwrap();
        assert_eq!(out.code, "body{color:red}");
    }

    #[test]
    fn test_compile_pretty_keeps_rule() {
        let out = compile_css("body { color: red; }", origin(), StyleOptions::default()).unwrap();
        assert!(out.code.contains("body {"));
        assert!(out.code.contains("color: red"));
    }

    #[test]
    fn test_advanced_merges_duplicate_rules() {
        let source = ".a { color: red; } .a { margin: 0; }";
        let plain = StyleOptions {
            minify: true,
            advanced: false,
        };
        let advanced = StyleOptions {
            minify: true,
            advanced: true,
        };

        let without = compile_css(source, origin(), plain).unwrap();
        let with = compile_css(source, origin(), advanced).unwrap();
        assert_eq!(without.code.matches(".a").count(), 2);
        assert_eq!(with.code.matches(".a").count(), 1);
    }

    #[test]
    fn test_invalid_selector_is_style_failure() {
        let failure =
            compile_css("..broken { color: red }", origin(), StyleOptions::default()).unwrap_err();
        assert!(failure.has_stage(Stage::Style));
        assert!(failure.records()[0].message.starts_with("src/main.css"));
    }
}
