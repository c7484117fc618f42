use std::path::Path;
use std::sync::LazyLock;

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::values::url::Url;
use lightningcss::visit_types;
use lightningcss::visitor::{Visit, VisitTypes, Visitor};
use parcel_sourcemap::SourceMap;
use regex::Regex;

use crate::bundle::{BundleError, Bundler, CssStyle};
use crate::transform::{Artifact, Transform, TransformContext};
use crate::utils::path::{is_bundleable_reference, strip_url_suffix};

static RENAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*)\.(sass|scss)$").unwrap());

/// Sass stylesheets. Compiles the file to CSS, walks every `url()` in
/// the result so the referenced assets land in the bundle too, and
/// optionally emits a source map next to the stylesheet.
///
/// The `url()` values themselves are written out unchanged. Stylesheets
/// resolve relatively in the browser the same way they do here, so a
/// rewrite would only matter for a transform that moves files around.
pub struct SassTransform;

impl Transform for SassTransform {
    fn name(&self) -> &'static str {
        "sass"
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| {
            ext.eq_ignore_ascii_case("sass") || ext.eq_ignore_ascii_case("scss")
        })
    }

    fn rename(&self, reference: &str) -> String {
        RENAME.replace(reference, "${1}.css").into_owned()
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> Result<Vec<Artifact>, BundleError> {
        let settings = &ctx.options.sass;
        let style = match settings.style {
            CssStyle::Expanded => grass::OutputStyle::Expanded,
            CssStyle::Compressed => grass::OutputStyle::Compressed,
        };
        let grass_options = grass::Options::default()
            .style(style)
            .load_paths(&settings.include_paths);

        let compiled = grass::from_path(ctx.resolved, &grass_options).map_err(|e| {
            BundleError::Compile {
                path: ctx.resolved.to_path_buf(),
                message: e.to_string(),
            }
        })?;

        let css_path = ctx.resolved.with_extension("css");
        let css_name = css_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut sheet = StyleSheet::parse(
            &compiled,
            ParserOptions {
                filename: ctx.resolved.display().to_string(),
                ..ParserOptions::default()
            },
        )
        .map_err(|e| BundleError::Compile {
            path: ctx.resolved.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut source_map = settings.source_map.then(|| {
            let mut map = SourceMap::new("/");
            map.add_source(ctx.file_name);
            map
        });
        if let Some(map) = &mut source_map {
            map.set_source_content(0, &compiled)
                .map_err(|e| BundleError::Compile {
                    path: ctx.resolved.to_path_buf(),
                    message: e.to_string(),
                })?;
        }

        let printed = sheet
            .to_css(PrinterOptions {
                minify: settings.style == CssStyle::Compressed,
                source_map: source_map.as_mut(),
                ..PrinterOptions::default()
            })
            .map_err(|e| BundleError::Compile {
                path: ctx.resolved.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut code = printed.code;
        if source_map.is_some() {
            code.push_str(&format!("\n/*# sourceMappingURL={css_name}.map */\n"));
        }

        let mut artifacts = vec![Artifact {
            path: css_path.clone(),
            contents: code.into_bytes(),
        }];

        // Pull in everything the stylesheet points at. This runs after
        // the stylesheet itself was emitted, so the bundle order matches
        // the reference order inside the document tree.
        let mut walker = UrlWalker {
            bundler: ctx.bundler,
            origin: ctx.dir,
        };
        sheet.visit(&mut walker)?;

        if let Some(map) = &mut source_map {
            let json = map.to_json(None).map_err(|e| BundleError::Compile {
                path: ctx.resolved.to_path_buf(),
                message: e.to_string(),
            })?;
            artifacts.push(Artifact {
                path: css_path.with_extension("css.map"),
                contents: json.into_bytes(),
            });
        }

        Ok(artifacts)
    }
}

/// Feeds every bundleable `url()` in a parsed stylesheet back into the
/// bundler without touching the value.
struct UrlWalker<'a> {
    bundler: &'a Bundler,
    origin: &'a Path,
}

impl<'a, 'i> Visitor<'i> for UrlWalker<'a> {
    type Error = BundleError;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(URLS)
    }

    fn visit_url(&mut self, url: &mut Url<'i>) -> Result<(), Self::Error> {
        let value = url.url.as_ref();
        if !is_bundleable_reference(value) {
            return Ok(());
        }
        let reference = strip_url_suffix(value);
        if reference.is_empty() {
            return Ok(());
        }

        self.bundler.resolve_and_rewrite(reference, self.origin)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::transform::sass::SassTransform;
    use crate::transform::Transform;

    #[test]
    fn test_matches_both_syntaxes() {
        let transform = SassTransform;
        assert!(transform.matches(Path::new("/site/style.scss")));
        assert!(transform.matches(Path::new("/site/style.sass")));
        assert!(!transform.matches(Path::new("/site/style.css")));
    }

    #[test]
    fn test_rename_swaps_extension() {
        let transform = SassTransform;
        assert_eq!(transform.rename("./css/main.scss"), "./css/main.css");
        assert_eq!(transform.rename("theme.sass"), "theme.css");
        assert_eq!(transform.rename("/css/a.SCSS"), "/css/a.css");
    }
}
