//! RDF triple

use crate::Term;
use serde::{Deserialize, Serialize};

/// A single (subject, predicate, object) statement
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub s: Term,
    pub p: Term,
    pub o: Term,
}

impl Triple {
    pub fn new(s: Term, p: Term, o: Term) -> Self {
        Self { s, p, o }
    }

    /// Whether `term` occurs in subject or object position
    pub fn mentions(&self, term: &Term) -> bool {
        &self.s == term || &self.o == term
    }
}

impl std::fmt::Display for Triple {
    /// One N-Triples line, without the trailing newline
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.s, self.p, self.o)
    }
}
