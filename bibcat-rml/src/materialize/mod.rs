//! Turning term specifications and source values into RDF terms

mod template;
mod term;

pub use template::{expand_template, iri_escape, template_names};
pub use term::{materialize_literal, materialize_object, BlankNodes};
