//! Identity resolution for BIBCAT graphs
//!
//! Mapping runs mint blank nodes (or transient IRIs) for agents, topics and
//! titles. [`Deduplicator`] replaces each with a canonical IRI: an existing
//! one when a candidate label matches, otherwise one minted from the label.
//!
//! Candidates come from a [`CandidateSource`]: the local triplestore
//! ([`TriplestoreCandidates`]) or the Library of Congress suggest service
//! ([`LocSuggestSource`]).

pub mod candidates;
pub mod dedup;
pub mod error;
pub mod index;
pub mod similarity;
pub mod slug;

pub use candidates::{
    default_label_predicates, Candidate, CandidateSource, DedupKey, LocSuggestSource,
    TriplestoreCandidates,
};
pub use dedup::{DedupConfig, DedupReport, Deduplicator, IdentityAssertion, Resolution};
pub use error::{DedupError, Result};
pub use index::DedupIndex;
pub use similarity::{similarity_ratio, MatchPolicy};
pub use slug::slugify;
