//! Error types for remote store operations

use thiserror::Error;

/// Errors from talking to a remote endpoint
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request exceeded the per-request timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client could not be constructed
    #[error("Client configuration error: {0}")]
    Client(String),
}

impl RemoteError {
    /// Whether a retry may succeed: connect failures, timeouts, 5xx and 429
    pub fn is_transient(&self) -> bool {
        match self {
            RemoteError::Timeout(_) | RemoteError::Network(_) => true,
            RemoteError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RemoteError::Timeout(e.to_string())
        } else if e.is_connect() || e.is_request() {
            RemoteError::Network(format!("connection failed: {e}"))
        } else if e.is_decode() {
            RemoteError::InvalidResponse(e.to_string())
        } else {
            RemoteError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RemoteError::Timeout("t".into()).is_transient());
        assert!(RemoteError::Network("n".into()).is_transient());
        assert!(RemoteError::Status { status: 503, body: String::new() }.is_transient());
        assert!(RemoteError::Status { status: 429, body: String::new() }.is_transient());
        assert!(!RemoteError::Status { status: 400, body: String::new() }.is_transient());
        assert!(!RemoteError::InvalidResponse("x".into()).is_transient());
    }
}
