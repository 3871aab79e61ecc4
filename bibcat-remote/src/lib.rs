//! Remote triplestore access for BIBCAT
//!
//! - [`TripleStore`]: async trait over a SPARQL endpoint (query + update)
//! - [`HttpTripleStore`]: form-encoded POST client with a hard per-request
//!   timeout and bounded retry for transient failures
//! - [`Backoff`] / [`RetryPolicy`]: exponential backoff with jitter, shared
//!   with the OAI-PMH harvester
//! - SPARQL JSON result types ([`Binding`], [`BindingValue`])

pub mod backoff;
pub mod error;
pub mod results;
pub mod store;
pub mod update;

pub use backoff::{with_retry, Backoff, RetryPolicy};
pub use error::{RemoteError, Result};
pub use results::{Binding, BindingValue, SparqlResults};
pub use store::{HttpTripleStore, TripleStore};
pub use update::insert_data;
