//! Template scanning. Walks an HTML document event by event, picks out
//! attributes that carry asset references and swaps them for the bundled
//! names handed back by the bundler.

pub mod tables;

use std::io::Cursor;
use std::path::Path;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::{Map, Value};

use crate::bundle::{BundleError, Bundler};
use crate::debug;
use crate::eval::{evaluate_attribute, render_text};
use crate::utils::path::{is_bundleable_reference, strip_url_suffix};

pub use tables::ScanTables;

/// One pass over a single document. References resolve relative to
/// `origin`, the directory the document lives in.
pub struct Scanner<'a> {
    bundler: &'a Bundler,
    document: &'a Path,
    origin: &'a Path,
    tables: &'a ScanTables,
    bindings: &'a Map<String, Value>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        bundler: &'a Bundler,
        document: &'a Path,
        origin: &'a Path,
        tables: &'a ScanTables,
        bindings: &'a Map<String, Value>,
    ) -> Self {
        Self {
            bundler,
            document,
            origin,
            tables,
            bindings,
        }
    }

    /// Rewrites every asset reference in `source` and returns the
    /// re-serialized document.
    ///
    /// `<meta>` handling is a two-step protocol: an attribute whose value
    /// names a known image/logo property arms the scanner, and the next
    /// `content` attribute (in any later position, even another tag) is
    /// treated as the reference that property points at.
    pub fn rewrite_document(&self, source: &str) -> Result<Vec<u8>, BundleError> {
        let mut reader = Reader::from_str(source);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;
        config.allow_dangling_amp = true;

        let mut writer = Writer::new(Cursor::new(Vec::with_capacity(source.len())));
        let mut meta_armed = false;

        loop {
            match reader.read_event() {
                Ok(Event::Start(elem)) => {
                    let rebuilt = self.rewrite_element(&elem, &mut meta_armed)?;
                    writer
                        .write_event(Event::Start(rebuilt))
                        .map_err(|e| BundleError::io(self.document, e))?;
                }
                Ok(Event::Empty(elem)) => {
                    let rebuilt = self.rewrite_element(&elem, &mut meta_armed)?;
                    writer
                        .write_event(Event::Empty(rebuilt))
                        .map_err(|e| BundleError::io(self.document, e))?;
                }
                Ok(Event::Text(text)) => {
                    let expanded = text
                        .decode()
                        .ok()
                        .and_then(|raw| render_text(&raw, self.bindings));
                    let event = match &expanded {
                        Some(rendered) => Event::Text(BytesText::new(rendered)),
                        None => Event::Text(text),
                    };
                    writer
                        .write_event(event)
                        .map_err(|e| BundleError::io(self.document, e))?;
                }
                Ok(Event::Eof) => break,
                Ok(event) => {
                    writer
                        .write_event(event)
                        .map_err(|e| BundleError::io(self.document, e))?;
                }
                Err(e) => {
                    return Err(BundleError::Compile {
                        path: self.document.to_path_buf(),
                        message: format!(
                            "parse error at position {}: {e:?}",
                            reader.error_position()
                        ),
                    });
                }
            }
        }

        Ok(writer.into_inner().into_inner())
    }

    /// Rebuilds a single element, rewriting any attribute the reference
    /// tables claim for this tag. Attributes that stay untouched keep
    /// their raw bytes, so the source escaping survives round trips.
    fn rewrite_element(
        &self,
        elem: &BytesStart<'_>,
        meta_armed: &mut bool,
    ) -> Result<BytesStart<'static>, BundleError> {
        let name = String::from_utf8_lossy(elem.name().as_ref()).into_owned();
        let tag = name.to_ascii_lowercase();
        let mut rebuilt = BytesStart::new(name);

        for attr in elem.html_attributes().with_checks(false) {
            let attr = attr.map_err(|e| BundleError::Compile {
                path: self.document.to_path_buf(),
                message: format!("malformed attribute in <{tag}>: {e}"),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let key_lower = key.to_ascii_lowercase();
            let value = attr.unescape_value().ok();

            // An armed scanner consumes the next content attribute no
            // matter where it shows up.
            let claims_content = *meta_armed && key_lower == "content";
            if claims_content {
                *meta_armed = false;
            }

            let mut rewritten = None;
            if let Some(value) = &value {
                if claims_content {
                    rewritten = self.resolve_candidate(value)?;
                } else if tag == "meta" && self.arms_meta(&key_lower, value) {
                    *meta_armed = true;
                } else if self.tables.reference_attr(&tag, &key_lower) {
                    rewritten = self.resolve_candidate(value)?;
                }
            }

            match rewritten {
                Some(renamed) => rebuilt.push_attribute((key.as_str(), renamed.as_str())),
                None => rebuilt.push_attribute(Attribute {
                    key: attr.key,
                    value: attr.value,
                }),
            }
        }

        Ok(rebuilt)
    }

    /// Whether this attribute names a meta property whose content carries
    /// an asset reference. Interpolated values count when they evaluate
    /// to a static string.
    fn arms_meta(&self, key: &str, raw: &str) -> bool {
        evaluate_attribute(raw, self.bindings)
            .as_static_str()
            .is_some_and(|value| self.tables.meta_value(key, value))
    }

    /// Runs one attribute value through evaluation and resolution.
    /// Returns the bundled name, or `None` when the value is dynamic,
    /// external or otherwise not a reference this pass should touch.
    fn resolve_candidate(&self, raw: &str) -> Result<Option<String>, BundleError> {
        let evaluated = evaluate_attribute(raw, self.bindings);
        let Some(value) = evaluated.as_static_str() else {
            debug!(
                "scan";
                "skipping dynamic value {:?} in {}",
                raw,
                self.document.display()
            );
            return Ok(None);
        };

        if !is_bundleable_reference(value) {
            return Ok(None);
        }
        let reference = strip_url_suffix(value);
        if reference.is_empty() {
            return Ok(None);
        }

        self.bundler
            .resolve_and_rewrite(reference, self.origin)
            .map(Some)
    }
}
