//! TriplesMap, LogicalSource and SubjectMap

use serde::{Deserialize, Serialize};

use super::{ObjectTerm, PredicateObjectMap, TermType};

/// How references and iterators of a logical source are evaluated
///
/// Decides which engine runs the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceFormulation {
    /// `ql:XPath` over an XML document
    XPath,
    /// `ql:JSONPath` over a JSON document
    JsonPath,
    /// `ql:SPARQL`: rows are bindings returned by a remote query
    Sparql,
    /// `ql:CSV` or no formulation: rows of a delimited table, columns by name
    Rows,
}

impl ReferenceFormulation {
    pub fn name(&self) -> &'static str {
        match self {
            ReferenceFormulation::XPath => "XPath",
            ReferenceFormulation::JsonPath => "JSONPath",
            ReferenceFormulation::Sparql => "SPARQL bindings",
            ReferenceFormulation::Rows => "rows",
        }
    }
}

/// `rml:logicalSource`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalSource {
    /// `rml:source` locator, informational for in-memory sources
    pub source: Option<String>,
    /// `rml:iterator`; `None` iterates the current node itself
    pub iterator: Option<String>,
    pub formulation: ReferenceFormulation,
    /// `rml:query` with `{name}` placeholders (bindings sources)
    pub query: Option<String>,
}

impl LogicalSource {
    pub fn new(formulation: ReferenceFormulation) -> Self {
        Self {
            source: None,
            iterator: None,
            formulation,
            query: None,
        }
    }

    pub fn with_iterator(mut self, iterator: impl Into<String>) -> Self {
        self.iterator = Some(iterator.into());
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// How a subject is produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubjectTerm {
    /// `rr:constant` / `rr:subject`
    Constant(String),
    /// `rr:template`
    Template(String),
    /// `rml:reference` / `rr:column`
    Reference(String),
    /// `rr:termType rr:BlankNode` without a value: a fresh node per row
    BlankNode,
}

/// `rr:subjectMap`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectMap {
    /// `None` only for bindings maps, whose iterator variable binds the subject
    pub term: Option<SubjectTerm>,
    /// IRI unless `rr:termType rr:BlankNode`
    pub term_type: TermType,
    /// `rr:class` values, asserted once the subject has other triples
    pub classes: Vec<String>,
    /// `kds:dedup`
    pub dedup: bool,
}

impl SubjectMap {
    pub fn new(term: SubjectTerm) -> Self {
        Self {
            term: Some(term),
            term_type: TermType::Iri,
            classes: Vec::new(),
            dedup: false,
        }
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self::new(SubjectTerm::Template(template.into()))
    }

    pub fn blank() -> Self {
        Self {
            term_type: TermType::BlankNode,
            ..Self::new(SubjectTerm::BlankNode)
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }
}

/// A complete `rr:TriplesMap`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriplesMap {
    /// IRI of the map in the rule graph
    pub iri: String,
    /// Maps without a logical source are kept but produce nothing
    pub logical_source: Option<LogicalSource>,
    pub subject_map: Option<SubjectMap>,
    /// Applied in declared order
    pub predicate_object_maps: Vec<PredicateObjectMap>,
}

impl TriplesMap {
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            logical_source: None,
            subject_map: None,
            predicate_object_maps: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: LogicalSource) -> Self {
        self.logical_source = Some(source);
        self
    }

    pub fn with_subject(mut self, subject_map: SubjectMap) -> Self {
        self.subject_map = Some(subject_map);
        self
    }

    pub fn with_pom(mut self, pom: PredicateObjectMap) -> Self {
        self.predicate_object_maps.push(pom);
        self
    }

    pub fn is_inert(&self) -> bool {
        self.logical_source.is_none()
    }

    pub fn formulation(&self) -> Option<ReferenceFormulation> {
        self.logical_source.as_ref().map(|ls| ls.formulation)
    }

    /// IRIs of maps referenced through `rr:parentTriplesMap`, in POM order
    pub fn parent_refs(&self) -> impl Iterator<Item = &str> {
        self.predicate_object_maps.iter().filter_map(|pom| match &pom.object {
            ObjectTerm::Parent(parent) => Some(parent.as_str()),
            _ => None,
        })
    }
}
