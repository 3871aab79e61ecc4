//! Deduplication error types

use bibcat_remote::RemoteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DedupError {
    /// Candidate lookup failed
    #[error("Candidate lookup failed: {0}")]
    Remote(#[from] RemoteError),

    /// A class filter that is not an absolute IRI
    #[error("Invalid class filter: {0}")]
    InvalidClass(String),

    /// A label that yields no identifier characters
    #[error("Label has no usable characters: {0:?}")]
    InvalidLabel(String),
}

pub type Result<T> = std::result::Result<T, DedupError>;
