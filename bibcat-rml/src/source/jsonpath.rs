//! JSONPath subset: `$`, `.key`, `['key']`, `[n]`, `[*]`, `.*`, `..key`
//!
//! Paths without a leading `$` are relative to the current node. A key step
//! applied to an array applies to each element.

use serde_json::Value;

use crate::error::{RmlError, RmlResult};

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(i64),
    Wildcard,
    Descendant(String),
}

/// A compiled JSONPath expression
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    expr: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    pub fn compile(expr: &str) -> RmlResult<Self> {
        let invalid = |message: &str| RmlError::InvalidPath {
            expr: expr.to_string(),
            message: message.to_string(),
        };

        let trimmed = expr.trim();
        let mut rest = trimmed
            .strip_prefix('$')
            .or_else(|| trimmed.strip_prefix('@'))
            .unwrap_or(trimmed);
        let mut segments = Vec::new();

        // A relative path may start with a bare key
        if !rest.is_empty() && !rest.starts_with(['.', '[']) {
            let (key, tail) = split_key(rest);
            if key.is_empty() {
                return Err(invalid("expected a key"));
            }
            segments.push(key_segment(key));
            rest = tail;
        }

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix("..") {
                let (key, tail) = split_key(after);
                if key.is_empty() {
                    return Err(invalid("expected a key after '..'"));
                }
                segments.push(Segment::Descendant(key.to_string()));
                rest = tail;
            } else if let Some(after) = rest.strip_prefix('.') {
                let (key, tail) = split_key(after);
                if key.is_empty() {
                    return Err(invalid("expected a key after '.'"));
                }
                segments.push(key_segment(key));
                rest = tail;
            } else if let Some(after) = rest.strip_prefix('[') {
                let close = after
                    .find(']')
                    .ok_or_else(|| invalid("unterminated '['"))?;
                let inner = after[..close].trim();
                let segment = if inner == "*" {
                    Segment::Wildcard
                } else if let Some(quoted) = inner
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                {
                    Segment::Key(quoted.to_string())
                } else {
                    Segment::Index(
                        inner
                            .parse()
                            .map_err(|_| invalid(&format!("bad index '{inner}'")))?,
                    )
                };
                segments.push(segment);
                rest = &after[close + 1..];
            } else {
                return Err(invalid(&format!("unexpected input at '{rest}'")));
            }
        }

        Ok(JsonPath {
            expr: expr.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Values selected from `node`
    pub fn select<'a>(&self, node: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![node];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                apply(segment, value, &mut next);
            }
            current = next;
        }
        current
    }

    /// Scalar values selected from `node`, stringified; arrays are flattened
    /// and nulls and objects skipped
    pub fn strings(&self, node: &Value) -> Vec<String> {
        let mut out = Vec::new();
        for value in self.select(node) {
            push_scalars(value, &mut out);
        }
        out
    }
}

fn split_key(s: &str) -> (&str, &str) {
    let end = s.find(['.', '[']).unwrap_or(s.len());
    (&s[..end], &s[end..])
}

fn key_segment(key: &str) -> Segment {
    if key == "*" {
        Segment::Wildcard
    } else {
        Segment::Key(key.to_string())
    }
}

fn apply<'a>(segment: &Segment, value: &'a Value, out: &mut Vec<&'a Value>) {
    match segment {
        Segment::Key(key) => match value {
            Value::Object(map) => out.extend(map.get(key)),
            Value::Array(items) => {
                for item in items {
                    apply(segment, item, out);
                }
            }
            _ => {}
        },
        Segment::Index(index) => {
            if let Value::Array(items) = value {
                let len = items.len() as i64;
                let resolved = if *index < 0 { len + index } else { *index };
                if (0..len).contains(&resolved) {
                    out.push(&items[resolved as usize]);
                }
            }
        }
        Segment::Wildcard => match value {
            Value::Object(map) => out.extend(map.values()),
            Value::Array(items) => out.extend(items.iter()),
            _ => {}
        },
        Segment::Descendant(key) => collect_descendants(key, value, out),
    }
}

fn collect_descendants<'a>(key: &str, value: &'a Value, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if key == "*" {
                out.extend(map.values());
            } else if let Some(found) = map.get(key) {
                out.push(found);
            }
            for child in map.values() {
                collect_descendants(key, child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_descendants(key, item, out);
            }
        }
        _ => {}
    }
}

fn push_scalars(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null | Value::Object(_) => {}
        Value::String(s) => out.push(s.clone()),
        Value::Bool(b) => out.push(b.to_string()),
        Value::Number(n) => out.push(n.to_string()),
        Value::Array(items) => {
            for item in items {
                push_scalars(item, out);
            }
        }
    }
}
