//! Input documents and the iteration nodes the engines walk
//!
//! A [`Source`] owns a parsed document; a [`Node`] borrows a position inside
//! one (or a bindings row) and knows how to iterate and evaluate references
//! in its own path language.

mod jsonpath;
mod rows;
mod xml;
mod xpath;

use std::collections::BTreeMap;

use bibcat_remote::Binding;
use serde_json::Value;

use crate::error::{RmlError, RmlResult};
use crate::mapping::ReferenceFormulation;

pub use jsonpath::JsonPath;
pub use rows::{parse_delimited, Row};
pub use xml::{ElementId, XmlAttribute, XmlDocument, XmlElement, XmlItem, XmlName};
pub use xpath::XPath;

/// A parsed input document
#[derive(Debug, Clone)]
pub enum Source {
    Xml(XmlDocument),
    Json(Value),
    Rows(Vec<Row>),
    /// No local document; bindings maps fetch their own rows
    None,
}

impl Source {
    pub fn from_xml_str(text: &str) -> RmlResult<Self> {
        XmlDocument::parse(text).map(Source::Xml)
    }

    pub fn from_json_str(text: &str) -> RmlResult<Self> {
        serde_json::from_str(text)
            .map(Source::Json)
            .map_err(|e| RmlError::Source(format!("JSON: {e}")))
    }

    pub fn from_delimited(text: &str, delimiter: char) -> RmlResult<Self> {
        parse_delimited(text, delimiter).map(Source::Rows)
    }

    /// The node top-level maps start from
    pub fn root(&self) -> Node<'_> {
        match self {
            Source::Xml(doc) => Node::Xml(doc, XmlItem::Element(XmlDocument::DOCUMENT)),
            Source::Json(value) => Node::Json(value),
            Source::Rows(rows) => Node::Table(rows),
            Source::None => Node::Empty,
        }
    }
}

/// A position in a source
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Xml(&'a XmlDocument, XmlItem),
    Json(&'a Value),
    Table(&'a [Row]),
    Row(&'a Row),
    Binding(&'a Binding),
    Empty,
}

impl<'a> Node<'a> {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Xml(..) => "XML",
            Node::Json(_) => "JSON",
            Node::Table(_) => "rows",
            Node::Row(_) => "row",
            Node::Binding(_) => "SPARQL bindings",
            Node::Empty => "no source",
        }
    }

    /// Whether a map with `formulation` can iterate this node
    pub fn accepts(&self, formulation: ReferenceFormulation) -> bool {
        match formulation {
            ReferenceFormulation::XPath => matches!(self, Node::Xml(..)),
            ReferenceFormulation::JsonPath => matches!(self, Node::Json(_)),
            ReferenceFormulation::Rows => matches!(self, Node::Table(_) | Node::Row(_)),
            // Bindings maps run their own query whatever they are invoked on
            ReferenceFormulation::Sparql => true,
        }
    }

    /// Iteration nodes selected by `iterator` from this node
    pub fn iterate(
        &self,
        iterator: Option<&str>,
        namespaces: &BTreeMap<String, String>,
    ) -> RmlResult<Vec<Node<'a>>> {
        match *self {
            Node::Xml(doc, item) => match iterator {
                None => Ok(vec![*self]),
                Some(expr) => {
                    let path = XPath::compile(expr, namespaces)?;
                    Ok(path
                        .select(doc, item)
                        .into_iter()
                        .map(|found| Node::Xml(doc, found))
                        .collect())
                }
            },
            Node::Json(value) => {
                let selected = match iterator {
                    None => vec![value],
                    Some(expr) => JsonPath::compile(expr)?.select(value),
                };
                let mut nodes = Vec::new();
                for v in selected {
                    match v {
                        Value::Array(items) => nodes.extend(items.iter().map(Node::Json)),
                        Value::Null => {}
                        other => nodes.push(Node::Json(other)),
                    }
                }
                Ok(nodes)
            }
            Node::Table(rows) => Ok(rows.iter().map(Node::Row).collect()),
            Node::Row(_) | Node::Binding(_) => Ok(vec![*self]),
            Node::Empty => Ok(Vec::new()),
        }
    }

    /// Values of `reference` at this node: trimmed, empty values dropped
    pub fn reference(
        &self,
        reference: &str,
        namespaces: &BTreeMap<String, String>,
    ) -> RmlResult<Vec<String>> {
        let raw = match *self {
            Node::Xml(doc, item) => XPath::compile(reference, namespaces)?.strings(doc, item),
            Node::Json(value) => JsonPath::compile(reference)?.strings(value),
            Node::Row(row) => row.get(reference).map(str::to_string).into_iter().collect(),
            Node::Binding(binding) => binding
                .get(reference)
                .map(|v| v.value.clone())
                .into_iter()
                .collect(),
            Node::Table(_) | Node::Empty => Vec::new(),
        };
        Ok(raw
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect())
    }

    /// First value of `reference`, if any
    pub fn first(
        &self,
        reference: &str,
        namespaces: &BTreeMap<String, String>,
    ) -> RmlResult<Option<String>> {
        Ok(self.reference(reference, namespaces)?.into_iter().next())
    }

    pub fn as_binding(&self) -> Option<&'a Binding> {
        match *self {
            Node::Binding(binding) => Some(binding),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_namespaces;
    use bibcat_remote::BindingValue;

    #[test]
    fn test_xml_iterate_and_reference() {
        let source = Source::from_xml_str(
            "<records><record><id> 1 </id></record><record><id>2</id><id/></record></records>",
        )
        .unwrap();
        let ns = default_namespaces();
        let nodes = source.root().iterate(Some("/records/record"), &ns).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].reference("id", &ns).unwrap(), vec!["1"]);
        assert_eq!(nodes[1].reference("id", &ns).unwrap(), vec!["2"]);
    }

    #[test]
    fn test_json_iterate_flattens_arrays() {
        let source = Source::from_json_str(r#"{"items": [{"t": "a"}, {"t": "b"}]}"#).unwrap();
        let ns = BTreeMap::new();
        let nodes = source.root().iterate(Some("$.items"), &ns).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].first("t", &ns).unwrap().as_deref(), Some("b"));

        let top = Source::from_json_str(r#"[{"t": "x"}]"#).unwrap();
        assert_eq!(top.root().iterate(None, &ns).unwrap().len(), 1);
    }

    #[test]
    fn test_rows_and_bindings() {
        let source = Source::from_delimited("id,title\n1,  \n", ',').unwrap();
        let ns = BTreeMap::new();
        let rows = source.root().iterate(None, &ns).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reference("id", &ns).unwrap(), vec!["1"]);
        assert!(rows[0].reference("title", &ns).unwrap().is_empty());

        let mut binding = Binding::new();
        binding.insert("work".to_string(), BindingValue::uri("http://x.org/w1"));
        let node = Node::Binding(&binding);
        assert_eq!(node.reference("work", &ns).unwrap(), vec!["http://x.org/w1"]);
        assert!(node.accepts(ReferenceFormulation::Sparql));
        assert!(!node.accepts(ReferenceFormulation::XPath));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            Source::from_json_str("{oops"),
            Err(RmlError::Source(_))
        ));
    }
}
