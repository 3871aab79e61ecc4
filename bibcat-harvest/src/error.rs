//! Harvest error types

use bibcat_remote::RemoteError;
use bibcat_rml::RmlError;
use thiserror::Error;

use crate::state::HarvestState;

#[derive(Error, Debug)]
pub enum HarvestError {
    /// A listing page could not be retrieved; `partial` holds everything
    /// accumulated before it
    #[error("Listing page {page} failed: {source}")]
    Page {
        page: usize,
        partial: Box<HarvestState>,
        source: Box<HarvestError>,
    },

    /// The repository answered with an OAI-PMH `<error>`
    #[error("OAI-PMH error {code}: {message}")]
    Protocol { code: String, message: String },

    /// Cancelled between pages
    #[error("Harvest cancelled after {} identifiers", .partial.len())]
    Cancelled { partial: Box<HarvestState> },

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Malformed response document
    #[error("Malformed response: {0}")]
    Xml(String),

    /// A harvested record could not be transformed
    #[error("Transform failed: {0}")]
    Transform(#[from] RmlError),

    /// A record worker ended without a result
    #[error("Record worker failed: {0}")]
    Worker(String),
}

impl HarvestError {
    /// State accumulated before the failure, when the harvest got that far
    pub fn partial(&self) -> Option<&HarvestState> {
        match self {
            HarvestError::Page { partial, .. } | HarvestError::Cancelled { partial } => {
                Some(partial)
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarvestError>;
