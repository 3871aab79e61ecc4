//! Predicate-object maps and the term types they produce

use bibcat_graph_ir::Term;
use bibcat_vocab::rdf;
use serde::{Deserialize, Serialize};

/// Term type from `rr:termType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TermType {
    #[default]
    Iri,
    BlankNode,
    Literal,
}

impl TermType {
    /// Parse term type from its rule vocabulary IRI
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            "http://www.w3.org/ns/r2rml#IRI" => Some(TermType::Iri),
            "http://www.w3.org/ns/r2rml#BlankNode" => Some(TermType::BlankNode),
            "http://www.w3.org/ns/r2rml#Literal" => Some(TermType::Literal),
            _ => None,
        }
    }
}

/// Where the object of a predicate-object map comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectTerm {
    /// `rr:constant` / `rr:object`, emitted as-is
    Constant(Term),
    /// `rr:template`
    Template(String),
    /// `rml:reference` / `rr:column`
    Reference(String),
    /// `rr:parentTriplesMap`: the subjects produced by another map
    Parent(String),
}

/// `rr:predicateObjectMap` together with its blank-node policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateObjectMap {
    pub predicate: String,
    pub object: ObjectTerm,
    /// `rr:datatype`
    pub datatype: Option<String>,
    /// `rr:language`
    pub language: Option<String>,
    /// `rr:termType`; `None` means the value decides
    pub term_type: Option<TermType>,
    /// `kds:delimiter`, applied one after another
    pub delimiters: Vec<String>,
    /// `rr:class` on the object map: wrap each value in a typed blank node
    pub sub_entity_class: Option<String>,
    /// `kds:valuePredicate`, links the sub-entity to its value
    pub value_predicate: String,
    /// `kds:reuseBlankNode`
    pub reuse_existing_blank_node: bool,
    /// Statements of the `kds:additionalPropertyUris` node, copied onto each sub-entity
    pub additional_triples: Vec<(String, Term)>,
}

impl PredicateObjectMap {
    pub fn new(predicate: impl Into<String>, object: ObjectTerm) -> Self {
        Self {
            predicate: predicate.into(),
            object,
            datatype: None,
            language: None,
            term_type: None,
            delimiters: Vec::new(),
            sub_entity_class: None,
            value_predicate: rdf::VALUE.to_string(),
            reuse_existing_blank_node: false,
            additional_triples: Vec::new(),
        }
    }

    pub fn reference(predicate: impl Into<String>, reference: impl Into<String>) -> Self {
        Self::new(predicate, ObjectTerm::Reference(reference.into()))
    }

    pub fn template(predicate: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(predicate, ObjectTerm::Template(template.into()))
    }

    pub fn constant(predicate: impl Into<String>, value: Term) -> Self {
        Self::new(predicate, ObjectTerm::Constant(value))
    }

    pub fn parent(predicate: impl Into<String>, parent: impl Into<String>) -> Self {
        Self::new(predicate, ObjectTerm::Parent(parent.into()))
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiters.push(delimiter.into());
        self
    }

    pub fn with_sub_entity(
        mut self,
        class: impl Into<String>,
        value_predicate: impl Into<String>,
    ) -> Self {
        self.sub_entity_class = Some(class.into());
        self.value_predicate = value_predicate.into();
        self
    }

    pub fn with_reuse(mut self) -> Self {
        self.reuse_existing_blank_node = true;
        self
    }

    pub fn with_datatype(mut self, datatype: impl Into<String>) -> Self {
        self.datatype = Some(datatype.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_term_type(mut self, term_type: TermType) -> Self {
        self.term_type = Some(term_type);
        self
    }

    pub fn is_parent(&self) -> bool {
        matches!(self.object, ObjectTerm::Parent(_))
    }

    /// Whether produced values are forced into literals
    pub fn is_literal_only(&self) -> bool {
        self.term_type == Some(TermType::Literal)
            || (self.term_type.is_none() && (self.datatype.is_some() || self.language.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_type_from_iri() {
        assert_eq!(
            TermType::from_iri("http://www.w3.org/ns/r2rml#IRI"),
            Some(TermType::Iri)
        );
        assert_eq!(
            TermType::from_iri("http://www.w3.org/ns/r2rml#BlankNode"),
            Some(TermType::BlankNode)
        );
        assert_eq!(
            TermType::from_iri("http://www.w3.org/ns/r2rml#Literal"),
            Some(TermType::Literal)
        );
        assert_eq!(TermType::from_iri("invalid"), None);
    }

    #[test]
    fn test_builder_defaults() {
        let pom = PredicateObjectMap::reference("http://x.org/title", "title");
        assert_eq!(pom.value_predicate, rdf::VALUE);
        assert!(!pom.reuse_existing_blank_node);
        assert!(!pom.is_parent());
        assert!(!pom.is_literal_only());

        let typed = pom.clone().with_datatype(bibcat_vocab::xsd::G_YEAR);
        assert!(typed.is_literal_only());
        let forced_iri = typed.with_term_type(TermType::Iri);
        assert!(!forced_iri.is_literal_only());
    }
}
