//! RDF graph - a collection of triples
//!
//! The `Graph` type uses `Vec<Triple>` to preserve duplicates (bag semantics)
//! and insertion order. `retain_unique()` drops repeats in place.

use crate::{BlankId, Term, Triple};
use bibcat_vocab::rdf;
use std::collections::{BTreeMap, HashMap, HashSet};

/// A collection of RDF triples
///
/// # Design Decisions
///
/// - **Vec storage**: duplicates produced by repeated source rows are kept.
/// - **Explicit deduplication**: call `retain_unique()` for set semantics.
/// - **Deterministic output**: triples serialize in the order they were added.
///
/// # Example
///
/// ```
/// use bibcat_graph_ir::{Graph, Term};
///
/// let mut graph = Graph::new();
/// graph.add_triple(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::string("Alice"),
/// );
/// assert_eq!(
///     graph.to_ntriples(),
///     "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" .\n"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    triples: Vec<Triple>,
    /// Base IRI from parsing
    pub base: Option<String>,
    /// Prefix mappings from parsing (deterministic order via BTreeMap)
    pub prefixes: BTreeMap<String, String>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base IRI
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    /// Add a prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Add a triple to the graph
    pub fn add(&mut self, triple: Triple) {
        self.triples.push(triple);
    }

    /// Add a triple by components
    pub fn add_triple(&mut self, s: Term, p: Term, o: Term) {
        self.add(Triple::new(s, p, o));
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over triples
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Get a reference to the triples
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Whether the exact triple is present
    pub fn contains(&self, s: &Term, p: &Term, o: &Term) -> bool {
        self.triples
            .iter()
            .any(|t| &t.s == s && &t.p == p && &t.o == o)
    }

    /// Objects of `(subject, predicate, ?)` in insertion order
    pub fn objects<'a, 'q>(
        &'a self,
        subject: &'q Term,
        predicate: &'q Term,
    ) -> impl Iterator<Item = &'a Term> + 'q
    where
        'a: 'q,
    {
        self.triples
            .iter()
            .filter(move |t| &t.s == subject && &t.p == predicate)
            .map(|t| &t.o)
    }

    /// First object of `(subject, predicate, ?)`
    pub fn object(&self, subject: &Term, predicate: &Term) -> Option<&Term> {
        self.objects(subject, predicate).next()
    }

    /// Whether `subject rdf:type class` is asserted
    pub fn has_type(&self, subject: &Term, class: &str) -> bool {
        let rdf_type = Term::iri(rdf::TYPE);
        let found = self
            .objects(subject, &rdf_type)
            .any(|o| o.as_iri() == Some(class));
        found
    }

    /// Subjects typed with `class`, first-seen order, no repeats
    pub fn subjects_with_type(&self, class: &str) -> Vec<&Term> {
        let mut out: Vec<&Term> = Vec::new();
        for t in &self.triples {
            if t.p.as_iri() == Some(rdf::TYPE)
                && t.o.as_iri() == Some(class)
                && !out.contains(&&t.s)
            {
                out.push(&t.s);
            }
        }
        out
    }

    /// Get all unique subjects in the graph (sorted)
    pub fn subjects(&self) -> Vec<&Term> {
        let mut subjects: Vec<&Term> = self.triples.iter().map(|t| &t.s).collect();
        subjects.sort();
        subjects.dedup();
        subjects
    }

    /// Rewrite every subject and object occurrence of `from` to `to`
    ///
    /// Returns the number of positions rewritten. Predicates are left alone.
    pub fn replace_term(&mut self, from: &Term, to: &Term) -> usize {
        let mut rewritten = 0;
        for t in &mut self.triples {
            if &t.s == from {
                t.s = to.clone();
                rewritten += 1;
            }
            if &t.o == from {
                t.o = to.clone();
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Append `other`, relabelling its blank nodes under `scope`
    ///
    /// Every blank node `_:x` of `other` becomes `_:{scope}{x}`, so blank
    /// nodes minted independently by different executions never collide.
    /// Prefixes of `other` are added when not already declared.
    pub fn merge_scoped(&mut self, other: Graph, scope: &str) {
        let mut relabelled: HashMap<BlankId, Term> = HashMap::new();
        let mut relabel = |term: Term| -> Term {
            match term {
                Term::BlankNode(id) => relabelled
                    .entry(id)
                    .or_insert_with_key(|id| Term::blank(format!("{}{}", scope, id.as_str())))
                    .clone(),
                other => other,
            }
        };

        self.triples.reserve(other.triples.len());
        for t in other.triples {
            let s = relabel(t.s);
            let o = relabel(t.o);
            self.triples.push(Triple::new(s, t.p, o));
        }
        for (prefix, ns) in other.prefixes {
            self.prefixes.entry(prefix).or_insert(ns);
        }
    }

    /// Drop repeated triples, keeping the first occurrence of each in place
    ///
    /// Returns the number removed.
    pub fn retain_unique(&mut self) -> usize {
        let before = self.triples.len();
        let mut seen: HashSet<Triple> = HashSet::with_capacity(before);
        self.triples.retain(|t| seen.insert(t.clone()));
        before - self.triples.len()
    }

    /// Serialize as N-Triples, one statement per line, in current order
    pub fn to_ntriples(&self) -> String {
        let mut out = String::new();
        for t in &self.triples {
            out.push_str(&t.to_string());
            out.push('\n');
        }
        out
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        Graph {
            triples: iter.into_iter().collect(),
            base: None,
            prefixes: BTreeMap::new(),
        }
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        self.triples.extend(iter);
    }
}
