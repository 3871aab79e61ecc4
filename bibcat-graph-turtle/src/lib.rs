//! Turtle (TTL) loading for BIBCAT rule graphs.
//!
//! Parsing is delegated to `rio_turtle`; every statement is forwarded to a
//! `bibcat_graph_ir::GraphSink`.
//!
//! # Example
//!
//! ```
//! use bibcat_graph_turtle::{parse, parse_to_graph};
//! use bibcat_graph_ir::GraphCollectorSink;
//!
//! let turtle = r#"
//!     @prefix ex: <http://example.org/> .
//!     ex:work ex:title "Moby Dick" .
//! "#;
//!
//! let mut sink = GraphCollectorSink::new();
//! parse(turtle, &mut sink).unwrap();
//! assert_eq!(sink.finish().len(), 1);
//!
//! let graph = parse_to_graph(turtle).unwrap();
//! assert_eq!(graph.prefixes.get("ex").map(String::as_str), Some("http://example.org/"));
//! ```

pub mod error;
mod parser;

pub use error::{Result, TurtleError};
pub use parser::parse;

use bibcat_graph_ir::{Graph, GraphCollectorSink};

/// Parse a Turtle document into a fresh [`Graph`]
pub fn parse_to_graph(input: &str) -> Result<Graph> {
    let mut sink = GraphCollectorSink::new();
    parse(input, &mut sink)?;
    Ok(sink.finish())
}
