//! Compiled rule structures
//!
//! These are produced by the [`crate::loader`] module and consumed by the
//! executor in [`crate::engine`].

mod compiled;
mod term_map;
mod triples_map;

pub use compiled::CompiledMapping;
pub use term_map::{ObjectTerm, PredicateObjectMap, TermType};
pub use triples_map::{LogicalSource, ReferenceFormulation, SubjectMap, SubjectTerm, TriplesMap};
