//! Best-effort evaluation of `{{ expr }}` interpolations.
//!
//! Attribute values and text nodes may interpolate expressions against the
//! run's bindings. Evaluation is deliberately restricted to literals and
//! binding lookups; anything else is treated as dynamic content the bundler
//! must not trace. "Not evaluable" is an expected outcome, not an error,
//! so it is modeled as an explicit result variant instead of an `Err`.

mod expr;

use expr::{evaluate_expression, scalar_to_string};
use serde_json::{Map, Value};

/// Result of evaluating an attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    /// The value is statically known.
    Static(Value),
    /// The value depends on something the evaluator cannot resolve.
    Dynamic,
}

impl Evaluated {
    /// The evaluated string, if the value is a static string.
    pub fn as_static_str(&self) -> Option<&str> {
        match self {
            Self::Static(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

/// One piece of an interpolated value.
enum Segment<'a> {
    Text(&'a str),
    Expr(&'a str),
}

/// Evaluate an attribute value.
///
/// A value without interpolations is its own static string. A value that
/// is exactly one `{{ expr }}` keeps the expression's type. Mixed values
/// stringify scalar results into the surrounding text; any evaluation
/// failure or non-scalar part makes the whole value dynamic.
pub fn evaluate_attribute(raw: &str, bindings: &Map<String, Value>) -> Evaluated {
    let Some(segments) = split_segments(raw) else {
        return Evaluated::Static(Value::String(raw.to_string()));
    };

    if let [Segment::Expr(source)] = segments.as_slice() {
        return match evaluate_expression(source, bindings) {
            Some(value) => Evaluated::Static(value),
            None => Evaluated::Dynamic,
        };
    }

    let mut out = String::with_capacity(raw.len());
    for segment in &segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Expr(source) => {
                let rendered = evaluate_expression(source, bindings)
                    .as_ref()
                    .and_then(scalar_to_string);
                match rendered {
                    Some(s) => out.push_str(&s),
                    None => return Evaluated::Dynamic,
                }
            }
        }
    }
    Evaluated::Static(Value::String(out))
}

/// Expand interpolations in a text node.
///
/// Returns `None` when the text contains no interpolation at all, so the
/// caller can pass the original through untouched. Expressions that fail
/// to evaluate (or produce non-scalar values) are left verbatim.
pub fn render_text(raw: &str, bindings: &Map<String, Value>) -> Option<String> {
    let segments = split_segments(raw)?;
    let mut out = String::with_capacity(raw.len());
    for segment in &segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Expr(source) => {
                let rendered = evaluate_expression(source, bindings)
                    .as_ref()
                    .and_then(scalar_to_string);
                match rendered {
                    Some(s) => out.push_str(&s),
                    None => {
                        out.push_str("{{");
                        out.push_str(source);
                        out.push_str("}}");
                    }
                }
            }
        }
    }
    Some(out)
}

/// Split a raw value into text and expression segments.
///
/// Returns `None` when no `{{` occurs. An unterminated `{{` (including one
/// whose `}}` only appears inside a string literal) is kept as plain text.
fn split_segments(raw: &str) -> Option<Vec<Segment<'_>>> {
    raw.find("{{")?;

    let mut segments = Vec::new();
    let mut rest = raw;
    while let Some(open) = rest.find("{{") {
        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }
        let body = &rest[open + 2..];
        match find_interpolation_end(body) {
            Some(close) => {
                segments.push(Segment::Expr(&body[..close]));
                rest = &body[close + 2..];
            }
            None => {
                segments.push(Segment::Text(&rest[open..]));
                rest = "";
                break;
            }
        }
    }
    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }
    Some(segments)
}

/// Find the `}}` closing an interpolation, skipping string literals.
fn find_interpolation_end(body: &str) -> Option<usize> {
    let bytes = body.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'\'' || b == b'"' {
                    quote = Some(b);
                } else if b == b'}' && bytes.get(i + 1) == Some(&b'}') {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "title": "WebPoint",
            "logo": "./img/logo.png",
            "version": 3,
            "nested": { "icon": "favicon.ico" },
            "links": [["Home", "/"], ["About", "/about.html"]],
        }) else {
            unreachable!()
        };
        map
    }

    // ------------------------------------------------------------------------
    // evaluate_attribute
    // ------------------------------------------------------------------------

    #[test]
    fn test_plain_literal_is_static() {
        let result = evaluate_attribute("./style.scss", &bindings());
        assert_eq!(result.as_static_str(), Some("./style.scss"));
    }

    #[test]
    fn test_whole_value_interpolation_keeps_type() {
        assert_eq!(
            evaluate_attribute("{{ version }}", &bindings()),
            Evaluated::Static(json!(3))
        );
        assert_eq!(
            evaluate_attribute("{{ logo }}", &bindings()).as_static_str(),
            Some("./img/logo.png")
        );
    }

    #[test]
    fn test_unknown_binding_is_dynamic() {
        assert_eq!(
            evaluate_attribute("{{ missing }}", &bindings()),
            Evaluated::Dynamic
        );
    }

    #[test]
    fn test_mixed_value_stringifies_scalars() {
        let result = evaluate_attribute("./img/v{{ version }}/logo.png", &bindings());
        assert_eq!(result.as_static_str(), Some("./img/v3/logo.png"));
    }

    #[test]
    fn test_mixed_value_with_non_scalar_is_dynamic() {
        assert_eq!(
            evaluate_attribute("x{{ links }}y", &bindings()),
            Evaluated::Dynamic
        );
    }

    #[test]
    fn test_member_and_index_access() {
        assert_eq!(
            evaluate_attribute("{{ nested.icon }}", &bindings()).as_static_str(),
            Some("favicon.ico")
        );
        assert_eq!(
            evaluate_attribute("{{ links[1][1] }}", &bindings()).as_static_str(),
            Some("/about.html")
        );
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(
            evaluate_attribute("{{ './img/' + nested.icon }}", &bindings()).as_static_str(),
            Some("./img/favicon.ico")
        );
    }

    #[test]
    fn test_unterminated_interpolation_is_text() {
        let result = evaluate_attribute("a{{b", &bindings());
        assert_eq!(result.as_static_str(), Some("a{{b"));
    }

    #[test]
    fn test_braces_inside_string_literal() {
        let result = evaluate_attribute("{{ '}}' + 'x' }}", &bindings());
        assert_eq!(result.as_static_str(), Some("}}x"));
    }

    // ------------------------------------------------------------------------
    // render_text
    // ------------------------------------------------------------------------

    #[test]
    fn test_render_text_without_interpolation() {
        assert_eq!(render_text("plain text", &bindings()), None);
    }

    #[test]
    fn test_render_text_expands_bindings() {
        assert_eq!(
            render_text("Welcome to {{ title }}!", &bindings()).as_deref(),
            Some("Welcome to WebPoint!")
        );
    }

    #[test]
    fn test_render_text_keeps_failed_expressions() {
        assert_eq!(
            render_text("{{ title }} and {{ missing }}", &bindings()).as_deref(),
            Some("WebPoint and {{ missing }}")
        );
    }
}
