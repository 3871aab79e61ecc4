//! Error types for Turtle parsing

/// Error type for Turtle parsing operations
#[derive(Debug, thiserror::Error)]
pub enum TurtleError {
    /// Syntax error reported by the underlying parser
    #[error("Parse error: {0}")]
    Parse(#[from] rio_turtle::TurtleError),

    /// RDF-star quoted triples are not part of the rule vocabulary
    #[error("Unsupported construct: {0}")]
    Unsupported(String),
}

/// Result type for Turtle operations
pub type Result<T> = std::result::Result<T, TurtleError>;
