//! Restricted literal expression evaluator.
//!
//! Grammar: string, number, boolean and null literals, array and object
//! literals, binding lookups with `.name` / `[index]` access chains, and
//! `+` for concatenation/addition. Anything outside the grammar, any
//! unknown binding and any invalid access simply evaluates to `None`;
//! this is never a general expression interpreter.

use serde_json::{Map, Number, Value};
use std::iter::Peekable;
use std::str::Chars;

/// Evaluate one expression source against the bindings.
///
/// Returns `None` unless the whole source parses and evaluates.
pub(super) fn evaluate_expression(source: &str, bindings: &Map<String, Value>) -> Option<Value> {
    let mut parser = ExprParser::new(source, bindings);
    let value = parser.parse_expression()?;
    parser.skip_whitespace();
    parser.chars.peek().is_none().then_some(value)
}

/// Render a scalar value the way it would appear in text.
pub(super) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

struct ExprParser<'a> {
    chars: Peekable<Chars<'a>>,
    bindings: &'a Map<String, Value>,
}

impl<'a> ExprParser<'a> {
    fn new(source: &'a str, bindings: &'a Map<String, Value>) -> Self {
        Self {
            chars: source.chars().peekable(),
            bindings,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn eat(&mut self, expected: char) -> Option<()> {
        (self.chars.next()? == expected).then_some(())
    }

    /// expr := operand ('+' operand)*
    fn parse_expression(&mut self) -> Option<Value> {
        let mut value = self.parse_operand()?;
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&'+') {
                self.chars.next();
                let right = self.parse_operand()?;
                value = add_values(value, right)?;
            } else {
                break;
            }
        }
        Some(value)
    }

    /// operand := literal | array | object | lookup, then access chains
    fn parse_operand(&mut self) -> Option<Value> {
        self.skip_whitespace();
        let value = match self.chars.peek()? {
            '\'' | '"' => self.parse_string()?,
            '[' => self.parse_array()?,
            '{' => self.parse_object()?,
            c if c.is_ascii_digit() || *c == '-' => self.parse_number()?,
            c if is_identifier_start(*c) => self.parse_lookup()?,
            _ => return None,
        };
        self.parse_access_chain(value)
    }

    fn parse_string(&mut self) -> Option<Value> {
        let quote = self.chars.next()?;
        let mut out = String::new();
        loop {
            let c = self.chars.next()?;
            if c == quote {
                break;
            }
            if c == '\\' {
                match self.chars.next()? {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    '0' => out.push('\0'),
                    other => out.push(other),
                }
            } else {
                out.push(c);
            }
        }
        Some(Value::String(out))
    }

    fn parse_number(&mut self) -> Option<Value> {
        let mut text = String::new();
        if self.chars.peek() == Some(&'-') {
            text.push('-');
            self.chars.next();
        }
        let mut is_float = false;
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.chars.next();
            } else if c == '.' && !is_float {
                is_float = true;
                text.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        if is_float {
            let parsed: f64 = text.parse().ok()?;
            Number::from_f64(parsed).map(Value::Number)
        } else {
            let parsed: i64 = text.parse().ok()?;
            Some(Value::Number(Number::from(parsed)))
        }
    }

    fn parse_array(&mut self) -> Option<Value> {
        self.eat('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&']') {
                self.chars.next();
                break;
            }
            items.push(self.parse_expression()?);
            self.skip_whitespace();
            match self.chars.peek() {
                Some(',') => {
                    self.chars.next();
                }
                Some(']') => {}
                _ => return None,
            }
        }
        Some(Value::Array(items))
    }

    fn parse_object(&mut self) -> Option<Value> {
        self.eat('{')?;
        let mut map = Map::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek() == Some(&'}') {
                self.chars.next();
                break;
            }
            let key = match self.chars.peek()? {
                '\'' | '"' => {
                    let Some(Value::String(key)) = self.parse_string() else {
                        return None;
                    };
                    key
                }
                c if is_identifier_start(*c) => self.parse_identifier(),
                _ => return None,
            };
            self.skip_whitespace();
            self.eat(':')?;
            let value = self.parse_expression()?;
            map.insert(key, value);
            self.skip_whitespace();
            match self.chars.peek() {
                Some(',') => {
                    self.chars.next();
                }
                Some('}') => {}
                _ => return None,
            }
        }
        Some(Value::Object(map))
    }

    fn parse_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(&c) = self.chars.peek() {
            if is_identifier_part(c) {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }
        name
    }

    /// Keyword literal or binding lookup.
    fn parse_lookup(&mut self) -> Option<Value> {
        let name = self.parse_identifier();
        match name.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            "null" => Some(Value::Null),
            _ => self.bindings.get(&name).cloned(),
        }
    }

    /// `.name` and `[index]` chains on the value parsed so far.
    fn parse_access_chain(&mut self, mut value: Value) -> Option<Value> {
        loop {
            self.skip_whitespace();
            match self.chars.peek() {
                Some('.') => {
                    self.chars.next();
                    self.skip_whitespace();
                    let name = self.parse_identifier();
                    if name.is_empty() {
                        return None;
                    }
                    value = value.get(&name)?.clone();
                }
                Some('[') => {
                    self.chars.next();
                    let index = self.parse_expression()?;
                    self.skip_whitespace();
                    self.eat(']')?;
                    value = index_value(&value, &index)?.clone();
                }
                _ => break,
            }
        }
        Some(value)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn index_value<'v>(value: &'v Value, index: &Value) -> Option<&'v Value> {
    match index {
        Value::Number(n) => value.get(usize::try_from(n.as_u64()?).ok()?),
        Value::String(s) => value.get(s.as_str()),
        _ => None,
    }
}

/// `+` on two values: numeric addition, or concatenation when either
/// side is a string and the other is a scalar.
fn add_values(left: Value, right: Value) -> Option<Value> {
    match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => add_numbers(l, r),
        (Value::String(_), _) | (_, Value::String(_)) => {
            let l = scalar_to_string(&left)?;
            let r = scalar_to_string(&right)?;
            Some(Value::String(l + &r))
        }
        _ => None,
    }
}

fn add_numbers(left: &Number, right: &Number) -> Option<Value> {
    if let (Some(l), Some(r)) = (left.as_i64(), right.as_i64()) {
        return l.checked_add(r).map(|sum| Value::Number(Number::from(sum)));
    }
    let sum = left.as_f64()? + right.as_f64()?;
    Number::from_f64(sum).map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings() -> Map<String, Value> {
        let Value::Object(map) = json!({
            "name": "site",
            "count": 2,
            "half": 0.5,
            "flag": true,
            "pages": ["index.html", "about.html"],
            "meta": { "image": "og.png" },
        }) else {
            unreachable!()
        };
        map
    }

    fn eval(source: &str) -> Option<Value> {
        evaluate_expression(source, &bindings())
    }

    // ------------------------------------------------------------------------
    // literals
    // ------------------------------------------------------------------------

    #[test]
    fn test_string_literals() {
        assert_eq!(eval("'style.css'"), Some(json!("style.css")));
        assert_eq!(eval("\"a b\""), Some(json!("a b")));
        assert_eq!(eval(r"'it\'s'"), Some(json!("it's")));
        assert_eq!(eval(r"'a\nb'"), Some(json!("a\nb")));
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert_eq!(eval("'open"), None);
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(eval("42"), Some(json!(42)));
        assert_eq!(eval("-7"), Some(json!(-7)));
        assert_eq!(eval("1.5"), Some(json!(1.5)));
        assert_eq!(eval("-"), None);
    }

    #[test]
    fn test_keyword_literals() {
        assert_eq!(eval("true"), Some(json!(true)));
        assert_eq!(eval("false"), Some(json!(false)));
        assert_eq!(eval("null"), Some(Value::Null));
    }

    #[test]
    fn test_array_and_object_literals() {
        assert_eq!(eval("[1, 'a', [2]]"), Some(json!([1, "a", [2]])));
        assert_eq!(eval("[]"), Some(json!([])));
        assert_eq!(eval("[1, 2,]"), Some(json!([1, 2])));
        assert_eq!(
            eval("{ src: 'x.png', 'alt': 'x' }"),
            Some(json!({"src": "x.png", "alt": "x"}))
        );
    }

    // ------------------------------------------------------------------------
    // lookups and access
    // ------------------------------------------------------------------------

    #[test]
    fn test_binding_lookup() {
        assert_eq!(eval("name"), Some(json!("site")));
        assert_eq!(eval("unknown"), None);
    }

    #[test]
    fn test_access_chains() {
        assert_eq!(eval("meta.image"), Some(json!("og.png")));
        assert_eq!(eval("pages[1]"), Some(json!("about.html")));
        assert_eq!(eval("meta['image']"), Some(json!("og.png")));
        assert_eq!(eval("pages[5]"), None);
        assert_eq!(eval("name.foo"), None);
    }

    // ------------------------------------------------------------------------
    // addition and concatenation
    // ------------------------------------------------------------------------

    #[test]
    fn test_addition() {
        assert_eq!(eval("1 + 2"), Some(json!(3)));
        assert_eq!(eval("count + 1"), Some(json!(3)));
        assert_eq!(eval("half + half"), Some(json!(1.0)));
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(eval("'a' + 'b' + 'c'"), Some(json!("abc")));
        assert_eq!(eval("'v' + count"), Some(json!("v2")));
        assert_eq!(eval("count + 'v'"), Some(json!("2v")));
    }

    #[test]
    fn test_invalid_addition_fails() {
        assert_eq!(eval("flag + flag"), None);
        assert_eq!(eval("pages + 'x'"), None);
    }

    #[test]
    fn test_trailing_garbage_fails() {
        assert_eq!(eval("1 2"), None);
        assert_eq!(eval("'a' %"), None);
    }
}
