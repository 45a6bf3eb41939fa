use std::path::Path;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::compiler::testing::{EchoStyle, FailingStyle, FixedScript};
use crate::compiler::{Compilers, ModuleFormat};
use crate::signal::RunContext;

const TEMPLATE: &str =
    "<html><head><title>{{TITLE}}</title></head><script>{{CODE}}</script><style>{{STYLE}}</style></html>";

fn settings(root: &Path) -> BuildSettings {
    let src = root.join("src");
    BuildSettings {
        paths: BuildPaths {
            template: src.join("main.html"),
            script: src.join("main.js"),
            style: src.join("main.css"),
            output: root.join("dist/main.html"),
        },
        title: "My Application".into(),
        script: ScriptOptions::default(),
        style: StyleOptions::default(),
    }
}

fn project(template: Option<&str>, style: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    if let Some(template) = template {
        std::fs::write(src.join("main.html"), template).unwrap();
    }
    std::fs::write(src.join("main.js"), "console.log(1)").unwrap();
    std::fs::write(src.join("main.css"), style).unwrap();
    dir
}

fn ctx() -> RunContext {
    RunContext {
        id: 1,
        token: CancellationToken::new(),
    }
}

#[tokio::test]
async fn test_concrete_scenario() {
    let dir = project(Some(TEMPLATE), "body{color:red}");
    let pipeline = Pipeline::new(
        settings(dir.path()),
        Compilers::new(FixedScript::ok("console.log(1)"), EchoStyle),
    );

    let built = pipeline.run(ctx()).await.unwrap();
    let html = std::fs::read_to_string(&built.output).unwrap();

    assert_eq!(built.output, dir.path().join("dist/main.html"));
    assert_eq!(built.bytes, html.len());
    assert!(html.contains("<title>My Application</title>"));
    assert!(html.contains("<script type=\"module\">console.log(1)</script>"));
    assert!(html.contains("<style>body{color:red}</style>"));
    assert!(!html.contains("{{"));
}

#[tokio::test]
async fn test_builtin_compilers_end_to_end() {
    let dir = project(Some(TEMPLATE), "body { color: red; }");
    let mut settings = settings(dir.path());
    settings.script.minify = true;
    settings.style = StyleOptions {
        minify: true,
        advanced: true,
    };
    let pipeline = Pipeline::new(settings, Compilers::builtin());

    let built = pipeline.run(ctx()).await.unwrap();
    let html = std::fs::read_to_string(built.output).unwrap();
    assert!(html.contains("console.log(1)"));
    assert!(html.contains("<style>body{color:red}</style>"));
}

#[tokio::test]
async fn test_script_failure_with_style_success_writes_nothing() {
    let dir = project(Some(TEMPLATE), "body{color:red}");
    let pipeline = Pipeline::new(
        settings(dir.path()),
        Compilers::new(FixedScript::fail("unexpected token"), EchoStyle),
    );

    let failure = pipeline.run(ctx()).await.unwrap_err();
    assert_eq!(failure.records().len(), 1);
    assert!(failure.has_stage(Stage::Script));
    assert!(!dir.path().join("dist/main.html").exists());
}

#[tokio::test]
async fn test_missing_template_is_template_failure() {
    let dir = project(None, "body{color:red}");
    let pipeline = Pipeline::new(
        settings(dir.path()),
        Compilers::new(FixedScript::ok("x"), EchoStyle),
    );

    let failure = pipeline.build(CancellationToken::new()).await.unwrap_err();
    assert!(failure.has_stage(Stage::Template));
    assert!(failure.records()[0].message.contains("main.html"));
}

#[tokio::test]
async fn test_simultaneous_failures_reported_together() {
    let dir = project(None, "body{color:red}");
    let pipeline = Pipeline::new(
        settings(dir.path()),
        Compilers::new(FixedScript::fail("bad script"), FailingStyle("bad style")),
    );

    let failure = pipeline.build(CancellationToken::new()).await.unwrap_err();
    assert_eq!(failure.error_count(), 3);
    assert!(failure.has_stage(Stage::Template));
    assert!(failure.has_stage(Stage::Script));
    assert!(failure.has_stage(Stage::Style));
}

#[tokio::test]
async fn test_missing_stylesheet_is_style_failure() {
    let dir = project(Some(TEMPLATE), "");
    std::fs::remove_file(dir.path().join("src/main.css")).unwrap();
    let pipeline = Pipeline::new(
        settings(dir.path()),
        Compilers::new(FixedScript::ok("x"), EchoStyle),
    );

    let failure = pipeline.build(CancellationToken::new()).await.unwrap_err();
    assert_eq!(failure.records().len(), 1);
    assert!(failure.has_stage(Stage::Style));
}

#[tokio::test]
async fn test_warnings_reach_the_result() {
    let dir = project(Some("{{CODE}}"), "body{color:red}");
    let mut settings = settings(dir.path());
    settings.script.format = ModuleFormat::Iife;
    let script = FixedScript(Ok(crate::compiler::Compiled::new("f()")
        .with_warnings(vec![ErrorRecord::warning(Stage::Script, "unused")])));
    let pipeline = Pipeline::new(settings, Compilers::new(script, EchoStyle));

    let built = pipeline.run(ctx()).await.unwrap();
    assert_eq!(built.warnings.len(), 2);
    assert_eq!(std::fs::read_to_string(built.output).unwrap(), "<script>f()</script>");
}

#[tokio::test]
async fn test_cancelled_run_never_writes() {
    let dir = project(Some(TEMPLATE), "body{color:red}");
    let pipeline = Pipeline::new(
        settings(dir.path()),
        Compilers::new(FixedScript::ok("x"), EchoStyle),
    );
    let ctx = ctx();
    ctx.token.cancel();

    assert!(pipeline.run(ctx).await.is_err());
    assert!(!dir.path().join("dist/main.html").exists());
}
