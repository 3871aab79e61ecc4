//! `{name}` template expansion

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{RmlError, RmlResult};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}\s]+)\}").expect("valid regex"));

/// Placeholder names of a `{name}` template, in order of appearance
pub fn template_names(template: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(template)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Expand a template, asking `resolve` for each placeholder's value
///
/// A placeholder name contains no whitespace or braces, so the group braces
/// of a query (`WHERE { ?s ?p ?o }`) pass through untouched.
///
/// `resolve` returns the text to splice in (already escaped if needed), or
/// `None` when the name has no value, which fails the whole expansion.
pub fn expand_template<F>(template: &str, mut resolve: F) -> RmlResult<String>
where
    F: FnMut(&str) -> RmlResult<Option<String>>,
{
    let mut result = String::with_capacity(template.len());
    let mut last = 0;

    for cap in PLACEHOLDER_RE.captures_iter(template) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        result.push_str(&template[last..whole.start()]);
        match resolve(name.as_str())? {
            Some(value) => result.push_str(&value),
            None => {
                return Err(RmlError::TemplateSubstitution {
                    template: template.to_string(),
                    name: name.as_str().to_string(),
                })
            }
        }
        last = whole.end();
    }
    result.push_str(&template[last..]);
    Ok(result)
}

/// IRI-escape a value spliced into an IRI template
///
/// Unreserved characters, sub-delims, `:` and `@` pass through; everything
/// else is percent-encoded as UTF-8.
pub fn iri_escape(value: &str) -> String {
    let mut result = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '.' | '_' | '~' => result.push(c),
            '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => result.push(c),
            ':' | '@' => result.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    result.push_str(&format!("%{byte:02X}"));
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(
        values: &'a HashMap<&str, &str>,
    ) -> impl FnMut(&str) -> RmlResult<Option<String>> + 'a {
        move |name| Ok(values.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_template_names() {
        assert_eq!(template_names("http://x.org/{id}"), vec!["id"]);
        assert_eq!(
            template_names("{base_iri}work/{mods:recordInfo/mods:recordIdentifier}"),
            vec!["base_iri", "mods:recordInfo/mods:recordIdentifier"]
        );
        assert!(template_names("http://x.org/static").is_empty());
    }

    #[test]
    fn test_expand_template() {
        let values = HashMap::from([("base", "http://x.org/"), ("id", "42")]);
        let out = expand_template("{base}work/{id}#{id}", lookup(&values)).unwrap();
        assert_eq!(out, "http://x.org/work/42#42");
        assert_eq!(
            expand_template("no placeholders", lookup(&values)).unwrap(),
            "no placeholders"
        );
    }

    #[test]
    fn test_query_braces_pass_through() {
        let values = HashMap::from([("subject", "http://x.org/w1")]);
        let out =
            expand_template("SELECT ?o WHERE { <{subject}> ?p ?o }", lookup(&values)).unwrap();
        assert_eq!(out, "SELECT ?o WHERE { <http://x.org/w1> ?p ?o }");
    }

    #[test]
    fn test_missing_name_fails() {
        let values = HashMap::from([("base", "http://x.org/")]);
        let err = expand_template("{base}{id}", lookup(&values)).unwrap_err();
        match err {
            RmlError::TemplateSubstitution { name, .. } => assert_eq!(name, "id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_iri_escape() {
        assert_eq!(iri_escape("hello"), "hello");
        assert_eq!(iri_escape("hello world"), "hello%20world");
        assert_eq!(iri_escape("a/b"), "a%2Fb");
        assert_eq!(iri_escape("café"), "caf%C3%A9");
        assert_eq!(iri_escape("x:y@z"), "x:y@z");
    }
}
