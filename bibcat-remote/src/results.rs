//! SPARQL 1.1 JSON results (`application/sparql-results+json`)

use bibcat_graph_ir::{Datatype, Term};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One solution row: variable name (without `?`) to bound value
pub type Binding = HashMap<String, BindingValue>;

/// A single bound value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingValue {
    /// `uri`, `literal`, `typed-literal` or `bnode`
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl BindingValue {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: "uri".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: "literal".to_string(),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }

    /// Convert to a graph term, keeping datatype and language
    pub fn to_term(&self) -> Term {
        match self.kind.as_str() {
            "uri" => Term::iri(&self.value),
            "bnode" => Term::blank(&self.value),
            _ => match (&self.lang, &self.datatype) {
                (Some(lang), _) => Term::lang_string(&self.value, lang),
                (None, Some(dt)) => Term::typed(&self.value, Datatype::from_iri(dt)),
                (None, None) => Term::string(&self.value),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

/// Top-level SPARQL JSON results document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    pub results: ResultsBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_deserialize() {
        let json = r#"{
            "head": {"vars": ["iri", "label"]},
            "results": {"bindings": [
                {
                    "iri": {"type": "uri", "value": "http://example.org/agent/1"},
                    "label": {"type": "literal", "value": "Melville, Herman", "xml:lang": "en"}
                },
                {
                    "iri": {"type": "uri", "value": "http://example.org/agent/2"},
                    "label": {"type": "typed-literal", "value": "1851",
                              "datatype": "http://www.w3.org/2001/XMLSchema#gYear"}
                }
            ]}
        }"#;

        let results: SparqlResults = serde_json::from_str(json).unwrap();
        assert_eq!(results.head.vars, vec!["iri", "label"]);
        assert_eq!(results.results.bindings.len(), 2);

        let first = &results.results.bindings[0];
        assert!(first["iri"].is_uri());
        assert_eq!(
            first["label"].to_term(),
            Term::lang_string("Melville, Herman", "en")
        );

        let second = &results.results.bindings[1];
        let term = second["label"].to_term();
        let (value, dt, _) = term.as_literal().unwrap();
        assert_eq!(value, "1851");
        assert_eq!(dt.as_iri(), "http://www.w3.org/2001/XMLSchema#gYear");
    }

    #[test]
    fn test_missing_head_is_tolerated() {
        let results: SparqlResults =
            serde_json::from_str(r#"{"results": {"bindings": []}}"#).unwrap();
        assert!(results.results.bindings.is_empty());
    }
}
