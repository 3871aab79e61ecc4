//! Typing of produced values

use std::collections::HashMap;

use bibcat_graph_ir::{Datatype, Term};

use crate::mapping::{PredicateObjectMap, TermType};

/// Term for one object value of `pom`
///
/// An explicit term type wins. Otherwise a configured datatype or language
/// makes a literal, a value starting with `http` an IRI, and anything else a
/// plain literal.
pub fn materialize_object(
    value: &str,
    pom: &PredicateObjectMap,
    blanks: &mut BlankNodes,
) -> Term {
    match pom.term_type {
        Some(TermType::Iri) => Term::iri(value),
        Some(TermType::BlankNode) => blanks.for_value(value),
        Some(TermType::Literal) => materialize_literal(value, pom),
        None if pom.datatype.is_some() || pom.language.is_some() => {
            materialize_literal(value, pom)
        }
        None if value.starts_with("http") => Term::iri(value),
        None => Term::string(value),
    }
}

/// Literal for `value` with `pom`'s language or datatype
pub fn materialize_literal(value: &str, pom: &PredicateObjectMap) -> Term {
    if let Some(lang) = &pom.language {
        Term::lang_string(value, lang)
    } else if let Some(datatype) = &pom.datatype {
        Term::typed(value, Datatype::from_iri(datatype))
    } else {
        Term::string(value)
    }
}

/// Blank node allocator for one execution
///
/// Every label comes from one counter. A source value typed as a blank node
/// maps to the node allocated on its first use, so distinct values never
/// share a node and never collide with fresh sub-entities.
#[derive(Debug, Clone)]
pub struct BlankNodes {
    prefix: String,
    next: u64,
    by_value: HashMap<String, Term>,
}

impl BlankNodes {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            by_value: HashMap::new(),
        }
    }

    /// A node no other call has returned
    pub fn fresh(&mut self) -> Term {
        let label = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        Term::blank(label)
    }

    /// The node standing for `value` in this execution
    pub fn for_value(&mut self, value: &str) -> Term {
        if let Some(term) = self.by_value.get(value) {
            return term.clone();
        }
        let term = self.fresh();
        self.by_value.insert(value.to_string(), term.clone());
        term
    }
}
