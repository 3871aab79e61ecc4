//! RML rule compiler and execution engines for BIBCAT
//!
//! Converts bibliographic sources (MODS and Dublin Core XML, JSON documents,
//! triple store query results, delimited text) into RDF according to RML
//! rules.
//!
//! # Key Features
//!
//! - **Rule loading**: rules are parsed from Turtle into the shared Graph IR
//!   and compiled into a validated table of TriplesMaps
//! - **Four engines**: XPath over XML, JSONPath over JSON, remote query
//!   bindings, and delimited rows, chosen per map from its reference
//!   formulation
//! - **Parent maps**: `rr:parentTriplesMap` runs the parent on demand with
//!   the child's row and links every subject it returns
//! - **Blank-node policy**: typed sub-entities, delimiter splitting and
//!   explicit blank node reuse, driven by the `kds:` vocabulary
//!
//! # Usage
//!
//! Load rules with [`RmlLoader::from_turtle()`], call `compile()` to get a
//! [`CompiledMapping`], then run an [`Executor`] over a [`Source`].

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod loader;
pub mod mapping;
pub mod materialize;
pub mod source;
pub mod vocab;

pub use config::{EngineConfig, DEFAULT_BINDINGS_PAGE_SIZE};
pub use context::{Context, ContextValue};
pub use engine::{transform, EngineKind, ExecutionStats, Executor};
pub use error::{RmlError, RmlResult};
pub use loader::RmlLoader;
pub use mapping::{
    CompiledMapping, LogicalSource, ObjectTerm, PredicateObjectMap, ReferenceFormulation,
    SubjectMap, SubjectTerm, TermType, TriplesMap,
};
pub use materialize::{expand_template, iri_escape};
pub use source::{Node, Row, Source};
pub use vocab::RML;
