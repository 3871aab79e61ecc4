//! GraphSink trait for event-driven graph construction
//!
//! Parsers call methods like `term_iri()` and `emit_triple()` on a sink
//! without knowing what the sink does with them. `GraphCollectorSink`
//! collects the events into a [`Graph`].

use crate::{Datatype, Graph, Term, Triple};
use std::collections::HashMap;

/// Opaque term identifier, valid only within a single sink session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TermId(pub(crate) u32);

impl TermId {
    /// Create a new TermId from a raw index
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Event-driven interface for RDF graph construction
///
/// # Example
///
/// ```
/// use bibcat_graph_ir::{GraphSink, GraphCollectorSink, Datatype};
///
/// let mut sink = GraphCollectorSink::new();
/// sink.on_prefix("rr", "http://www.w3.org/ns/r2rml#");
///
/// let map = sink.term_iri("http://example.org/map/work");
/// let label = sink.term_iri("http://www.w3.org/2000/01/rdf-schema#label");
/// let text = sink.term_literal("Work map", Datatype::xsd_string(), None);
/// sink.emit_triple(map, label, text);
///
/// let graph = sink.finish();
/// assert_eq!(graph.len(), 1);
/// ```
pub trait GraphSink {
    /// Called when a base IRI is declared (`@base <...> .`)
    fn on_base(&mut self, base_iri: &str);

    /// Called when a prefix is declared (`@prefix rr: <...> .`)
    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str);

    /// Create an IRI term and return its ID
    ///
    /// The IRI should be fully expanded.
    fn term_iri(&mut self, iri: &str) -> TermId;

    /// Create a blank node term and return its ID
    ///
    /// A labelled blank node keeps its identity across calls with the same
    /// label; `None` generates a fresh node.
    fn term_blank(&mut self, label: Option<&str>) -> TermId;

    /// Create a literal term from its lexical form
    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId;

    /// Emit a triple using previously created term IDs
    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId);
}

/// A sink that collects triples into a Graph
#[derive(Debug, Default)]
pub struct GraphCollectorSink {
    graph: Graph,
    /// Terms indexed by TermId
    terms: Vec<Term>,
    blank_counter: u32,
    blank_labels: HashMap<String, TermId>,
}

impl GraphCollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish building and return the graph
    pub fn finish(self) -> Graph {
        self.graph
    }

    /// Get the current graph (non-consuming)
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn get_term(&self, id: TermId) -> &Term {
        &self.terms[id.0 as usize]
    }

    fn add_term(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term);
        id
    }
}

impl GraphSink for GraphCollectorSink {
    fn on_base(&mut self, base_iri: &str) {
        self.graph.set_base(base_iri);
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.graph.add_prefix(prefix, namespace_iri);
    }

    fn term_iri(&mut self, iri: &str) -> TermId {
        self.add_term(Term::iri(iri))
    }

    fn term_blank(&mut self, label: Option<&str>) -> TermId {
        match label {
            Some(l) => {
                if let Some(&id) = self.blank_labels.get(l) {
                    return id;
                }
                let id = self.add_term(Term::blank(l));
                self.blank_labels.insert(l.to_string(), id);
                id
            }
            None => {
                self.blank_counter += 1;
                let label = format!("genid{}", self.blank_counter);
                self.add_term(Term::blank(label))
            }
        }
    }

    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId {
        let term = match language {
            Some(lang) => Term::lang_string(value, lang),
            None if datatype.is_xsd_string() => Term::string(value),
            None => Term::typed(value, datatype),
        };
        self.add_term(term)
    }

    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId) {
        let s = self.get_term(subject).clone();
        let p = self.get_term(predicate).clone();
        let o = self.get_term(object).clone();
        self.graph.add(Triple::new(s, p, o));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_sink_basic() {
        let mut sink = GraphCollectorSink::new();

        let s = sink.term_iri("http://example.org/map/work");
        let p = sink.term_iri("http://www.w3.org/ns/r2rml#subjectMap");
        let o = sink.term_blank(Some("sm"));
        sink.emit_triple(s, p, o);

        let graph = sink.finish();
        assert_eq!(graph.len(), 1);
        let triple = graph.iter().next().unwrap();
        assert_eq!(triple.s.as_iri(), Some("http://example.org/map/work"));
        assert_eq!(triple.o, Term::blank("sm"));
    }

    #[test]
    fn test_collector_sink_blank_nodes() {
        let mut sink = GraphCollectorSink::new();

        let b1 = sink.term_blank(Some("b0"));
        let b2 = sink.term_blank(Some("b0"));
        assert_eq!(b1, b2);

        let b3 = sink.term_blank(Some("b1"));
        assert_ne!(b1, b3);

        let anon1 = sink.term_blank(None);
        let anon2 = sink.term_blank(None);
        assert_ne!(anon1, anon2);
    }

    #[test]
    fn test_collector_sink_prefixes() {
        let mut sink = GraphCollectorSink::new();
        sink.on_base("http://example.org/");
        sink.on_prefix("rml", "http://semweb.mmlab.be/ns/rml#");

        let graph = sink.finish();
        assert_eq!(graph.base, Some("http://example.org/".to_string()));
        assert_eq!(
            graph.prefixes.get("rml"),
            Some(&"http://semweb.mmlab.be/ns/rml#".to_string())
        );
    }

    #[test]
    fn test_collector_sink_language_literal() {
        let mut sink = GraphCollectorSink::new();
        let s = sink.term_iri("http://example.org/work/1");
        let p = sink.term_iri("http://www.w3.org/2000/01/rdf-schema#label");
        let o = sink.term_literal("Moby-Dick", Datatype::rdf_lang_string(), Some("en"));
        sink.emit_triple(s, p, o);

        let graph = sink.finish();
        let triple = graph.iter().next().unwrap();
        let (value, datatype, language) = triple.o.as_literal().unwrap();
        assert_eq!(value, "Moby-Dick");
        assert!(datatype.is_lang_string());
        assert_eq!(language, Some("en"));
    }
}
