use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::bundle::BundleError;
use crate::scan::Scanner;
use crate::transform::{Artifact, Transform, TransformContext};

static RENAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^(.*)\.html?$").unwrap());

/// HTML templates. Scans the document for asset references, pulls every
/// referenced file into the bundle and emits the rewritten document.
/// Both `.html` and `.htm` sources come out as `.html`.
pub struct TemplateTransform;

impl Transform for TemplateTransform {
    fn name(&self) -> &'static str {
        "template"
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
        })
    }

    fn rename(&self, reference: &str) -> String {
        RENAME.replace(reference, "${1}.html").into_owned()
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> Result<Vec<Artifact>, BundleError> {
        let source =
            fs::read_to_string(ctx.resolved).map_err(|e| BundleError::io(ctx.resolved, e))?;

        let scanner = Scanner::new(
            ctx.bundler,
            ctx.resolved,
            ctx.dir,
            &ctx.options.tables,
            &ctx.options.template.bindings,
        );
        let contents = scanner.rewrite_document(&source)?;

        Ok(vec![Artifact {
            path: ctx.resolved.with_extension("html"),
            contents,
        }])
    }
}
