//! RDF graph intermediate representation for BIBCAT
//!
//! The mapping engine writes its output into a [`Graph`], the deduplicator
//! rewrites it, and the harvester merges many of them together. Rule graphs
//! loaded from Turtle use the same representation.
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - IRIs are stored in expanded form.
//!
//! 2. **Explicit datatypes** - Literals always carry a datatype. Plain strings
//!    use `xsd:string`, language-tagged strings use `rdf:langString`.
//!
//! 3. **Bag semantics** - `Graph` is an append-only `Vec<Triple>`. Call
//!    `dedupe()` explicitly for set semantics.
//!
//! 4. **Blank nodes compare by label only** - two blank nodes are the same
//!    node only when their labels are equal within one graph. Merging graphs
//!    goes through [`Graph::merge_scoped`], which relabels the incoming nodes.
//!
//! # Example
//!
//! ```
//! use bibcat_graph_ir::{Graph, Term};
//!
//! let mut graph = Graph::new();
//! graph.add_triple(
//!     Term::iri("http://example.org/work/1"),
//!     Term::iri("http://id.loc.gov/ontologies/bibframe/mainTitle"),
//!     Term::string("Moby Dick"),
//! );
//! assert_eq!(graph.len(), 1);
//! ```

pub mod datatype;
mod graph;
mod ntriples;
mod sink;
mod term;
mod triple;

pub use datatype::Datatype;
pub use graph::Graph;
pub use sink::{GraphCollectorSink, GraphSink, TermId};
pub use term::{BlankId, Term};
pub use triple::Triple;
