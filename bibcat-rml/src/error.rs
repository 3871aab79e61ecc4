//! RML error types

use thiserror::Error;

/// Rule compilation and execution errors
#[derive(Debug, Error)]
pub enum RmlError {
    /// Error parsing a rule document
    #[error("Parse error: {0}")]
    Parse(String),

    /// Missing required property in a rule
    #[error("Missing required property: {0}")]
    MissingProperty(String),

    /// Invalid property value
    #[error("Invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },

    /// Reference to a TriplesMap that is not defined
    #[error("Unknown TriplesMap {parent} referenced from {child}")]
    UnknownTriplesMap { child: String, parent: String },

    /// A parent chain leads back to where it started
    #[error("Cyclic parentTriplesMap chain: {}", .0.join(" -> "))]
    ParentCycle(Vec<String>),

    /// The node handed to a map does not match its reference formulation
    #[error("TriplesMap {map} expects {expected} input, got {found}")]
    SourceMismatch {
        map: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A template placeholder resolved to nothing
    #[error("Template {template}: no value for {{{name}}}")]
    TemplateSubstitution { template: String, name: String },

    /// Malformed path expression (XPath / JSONPath)
    #[error("Invalid path expression '{expr}': {message}")]
    InvalidPath { expr: String, message: String },

    /// Source document could not be read (XML, JSON, delimited text)
    #[error("Source error: {0}")]
    Source(String),

    /// Remote query backing a bindings map failed
    #[error("Remote query failed: {0}")]
    Remote(#[from] bibcat_remote::RemoteError),
}

impl RmlError {
    /// Structural problems with the rules themselves; fatal for the run
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RmlError::MissingProperty(_)
                | RmlError::InvalidValue { .. }
                | RmlError::UnknownTriplesMap { .. }
                | RmlError::ParentCycle(_)
                | RmlError::SourceMismatch { .. }
                | RmlError::InvalidPath { .. }
        )
    }
}

impl From<bibcat_graph_turtle::TurtleError> for RmlError {
    fn from(e: bibcat_graph_turtle::TurtleError) -> Self {
        RmlError::Parse(e.to_string())
    }
}

/// Result type for RML operations
pub type RmlResult<T> = Result<T, RmlError>;
