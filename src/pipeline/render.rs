//! Placeholder substitution.
//!
//! Recognized forms: `{{ NAME }}` and `<%= NAME %>`. Known names are `CODE`,
//! `STYLE` and `TITLE`; anything else is left as written. Injected content
//! is compiler output and is inserted verbatim.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{BuildArtifact, BuildSettings};
use crate::compiler::{Compiled, ModuleFormat};
use crate::core::{ErrorRecord, Stage};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\{\{[ \t\r\n]*([A-Za-z_][A-Za-z0-9_]*)[ \t\r\n]*\}\}|<%=[ \t\r\n]*([A-Za-z_][A-Za-z0-9_]*)[ \t\r\n]*%>",
    )
    .unwrap()
});

/// Substitute compiled script, stylesheet and title into the template.
pub fn render_page(
    template: &str,
    script: &Compiled,
    style: &Compiled,
    settings: &BuildSettings,
) -> BuildArtifact {
    let code = match settings.script.format {
        ModuleFormat::Esm => format!("<script type=\"module\">{}</script>", script.code),
        ModuleFormat::Iife => format!("<script>{}</script>", script.code),
    };
    let css = format!("<style>{}</style>", style.code);

    let mut has_code = false;
    let mut has_style = false;
    let html = PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            match name {
                "CODE" => {
                    has_code = true;
                    code.clone()
                }
                "STYLE" => {
                    has_style = true;
                    css.clone()
                }
                "TITLE" => settings.title.clone(),
                _ => caps[0].to_string(),
            }
        })
        .into_owned();

    let mut warnings = Vec::with_capacity(script.warnings.len() + style.warnings.len());
    warnings.extend(script.warnings.iter().cloned());
    warnings.extend(style.warnings.iter().cloned());
    if !has_code {
        warnings.push(ErrorRecord::warning(
            Stage::Template,
            "template has no CODE placeholder, script not inlined",
        ));
    }
    if !has_style {
        warnings.push(ErrorRecord::warning(
            Stage::Template,
            "template has no STYLE placeholder, stylesheet not inlined",
        ));
    }

    BuildArtifact { html, warnings }
}
