//! In-process script bundling with oxc.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{Program, Statement};
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;
use tokio_util::sync::CancellationToken;

use super::{Compiled, ModuleFormat, Optimization, ScriptCompiler, ScriptOptions, spawn_compile};
use crate::core::{ErrorRecord, Failure, Stage};
use crate::signal::{Signal, SignalResult};

/// Built-in script compiler: parse, optionally minify, print.
pub struct OxcScript;

impl ScriptCompiler for OxcScript {
    fn name(&self) -> &str {
        "oxc"
    }

    fn compile(
        &self,
        entry: &Path,
        options: &ScriptOptions,
        token: CancellationToken,
    ) -> Signal<Compiled> {
        let entry = entry.to_path_buf();
        let options = options.clone();

        spawn_compile(Stage::Script, token, move || {
            let source = std::fs::read_to_string(&entry).map_err(|e| {
                Failure::error(Stage::Script, format!("cannot read {}: {e}", entry.display()))
            })?;
            transform(&source, &entry, &options)
        })
    }
}

impl Optimization {
    fn compress(self) -> Option<CompressOptions> {
        match self {
            Self::Smallest => Some(CompressOptions::smallest()),
            Self::Safest => Some(CompressOptions::safest()),
            Self::None => None,
        }
    }
}

/// Compile one script source. `entry` is only used for diagnostics.
pub fn transform(source: &str, entry: &Path, options: &ScriptOptions) -> SignalResult<Compiled> {
    let allocator = Allocator::default();
    let source_type = match options.format {
        ModuleFormat::Esm => SourceType::mjs(),
        ModuleFormat::Iife => SourceType::cjs(),
    };

    let ret = Parser::new(&allocator, source, source_type).parse();
    if !ret.errors.is_empty() {
        let records = ret
            .errors
            .iter()
            .map(|e| ErrorRecord::error(Stage::Script, format!("{}: {e}", entry.display())))
            .collect();
        return Err(Failure::from_records(records));
    }

    let mut program = ret.program;
    let warnings = unsupported_features(&program, entry, options);

    let code = if options.minify {
        let minifier = MinifierOptions {
            mangle: (!options.keep_names).then(MangleOptions::default),
            compress: options.optimization.compress(),
        };
        let ret = Minifier::new(minifier).minify(&allocator, &mut program);
        Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(ret.scoping)
            .build(&program)
            .code
    } else {
        Codegen::new().build(&program).code
    };

    let mut code = match (options.format, options.minify) {
        (ModuleFormat::Esm, _) => code,
        (ModuleFormat::Iife, true) => format!("(()=>{{{code}}})();"),
        (ModuleFormat::Iife, false) => format!("(() => {{\n{code}}})();\n"),
    };

    if options.source_map {
        let name = entry
            .file_name()
            .map_or_else(|| entry.display().to_string(), |n| n.to_string_lossy().into_owned());
        if !code.ends_with('\n') {
            code.push('\n');
        }
        code.push_str(&format!("//# sourceURL={name}"));
    }

    Ok(Compiled::new(code).with_warnings(warnings))
}

/// Warn about what this compiler leaves untouched: it neither lowers syntax
/// nor resolves imports, so both need an external bundler.
fn unsupported_features(program: &Program<'_>, entry: &Path, options: &ScriptOptions) -> Vec<ErrorRecord> {
    let mut warnings = Vec::new();

    if !options.target.eq_ignore_ascii_case("esnext") {
        warnings.push(ErrorRecord::warning(
            Stage::Script,
            format!(
                "{}: target `{}` is not applied by the built-in compiler, set [script].command to a bundler",
                entry.display(),
                options.target
            ),
        ));
    }

    let imports = program
        .body
        .iter()
        .filter(|stmt| match stmt {
            Statement::ImportDeclaration(_) | Statement::ExportAllDeclaration(_) => true,
            Statement::ExportNamedDeclaration(decl) => decl.source.is_some(),
            _ => false,
        })
        .count();
    if imports > 0 {
        warnings.push(ErrorRecord::warning(
            Stage::Script,
            format!(
                "{}: {imports} module import(s) left unbundled and will not resolve from the output page, set [script].command to a bundler",
                entry.display()
            ),
        ));
    }

    warnings
}
