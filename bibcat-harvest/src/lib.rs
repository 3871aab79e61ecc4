//! OAI-PMH harvesting for BIBCAT
//!
//! [`Harvester`] pages through `ListIdentifiers` responses, following
//! resumption tokens until the listing is exhausted or the declared
//! `completeListSize` is reached. [`RecordPipeline`] then fetches each
//! record with `GetRecord` and runs a compiled mapping over it, several
//! records at a time.

pub mod client;
pub mod error;
pub mod harvester;
pub mod pipeline;
pub mod protocol;
pub mod state;

pub use client::{HttpOaiClient, ListRequest, ListingClient};
pub use error::{HarvestError, Result};
pub use harvester::{CancelFlag, HarvestOptions, Harvester};
pub use pipeline::{RecordFailure, RecordPipeline, TransformReport, DEFAULT_CONCURRENCY};
pub use protocol::{parse_list_identifiers, parse_response};
pub use state::{HarvestPhase, HarvestState, ListingPage};
