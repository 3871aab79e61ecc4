//! The pagination loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::client::{ListRequest, ListingClient};
use crate::error::{HarvestError, Result};
use crate::state::{HarvestPhase, HarvestState};

/// What to list and how much of it to keep
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HarvestOptions {
    pub metadata_prefix: String,
    pub set: Option<String>,
    /// Randomly keep this many identifiers once listing is done
    pub sample_size: Option<usize>,
    /// Seed for sampling; entropy when absent
    pub seed: Option<u64>,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            metadata_prefix: "mods".to_string(),
            set: None,
            sample_size: None,
            seed: None,
        }
    }
}

impl HarvestOptions {
    pub fn new(metadata_prefix: impl Into<String>) -> Self {
        Self {
            metadata_prefix: metadata_prefix.into(),
            ..Self::default()
        }
    }

    pub fn with_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    pub fn with_sample(mut self, size: usize, seed: Option<u64>) -> Self {
        self.sample_size = Some(size);
        self.seed = seed;
        self
    }
}

/// Shared cancellation signal, checked at page and record boundaries
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Accumulates the identifiers a repository lists
///
/// Pages are requested one after another; each resumption token comes from
/// the previous response.
#[derive(Debug)]
pub struct Harvester {
    client: Arc<dyn ListingClient>,
    options: HarvestOptions,
    cancel: CancelFlag,
}

impl Harvester {
    pub fn new(client: Arc<dyn ListingClient>, options: HarvestOptions) -> Self {
        Self {
            client,
            options,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn options(&self) -> &HarvestOptions {
        &self.options
    }

    /// List every identifier and return the state in [`HarvestPhase::Done`]
    ///
    /// A failed page ends the harvest with [`HarvestError::Page`] carrying
    /// what was accumulated; cancellation yields [`HarvestError::Cancelled`].
    pub async fn harvest(&self) -> Result<HarvestState> {
        let mut state = HarvestState::new();
        state.set_phase(HarvestPhase::Listing);

        let first = ListRequest::Initial {
            metadata_prefix: self.options.metadata_prefix.clone(),
            set: self.options.set.clone(),
        };
        self.fetch_page(&mut state, &first).await?;
        tracing::info!(
            identifiers = state.len(),
            total = ?state.total_expected(),
            "first listing page"
        );

        while state.should_resume() {
            if self.cancel.is_cancelled() {
                tracing::info!(identifiers = state.len(), "harvest cancelled");
                return Err(HarvestError::Cancelled {
                    partial: Box::new(state),
                });
            }
            state.set_phase(HarvestPhase::Resuming);

            let token = state.resumption_token().unwrap_or_default().to_string();
            let request = ListRequest::Resume {
                token: token.clone(),
            };
            let added = self.fetch_page(&mut state, &request).await?;
            tracing::debug!(
                page = state.pages(),
                added,
                identifiers = state.len(),
                "resumed listing"
            );

            if added == 0 && state.resumption_token() == Some(token.as_str()) {
                tracing::warn!(
                    token = %token,
                    "repository repeated its resumption token; stopping"
                );
                break;
            }
        }

        if let Some(size) = self.options.sample_size {
            let mut rng = match self.options.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            state.sample(size, &mut rng);
        }

        state.set_phase(HarvestPhase::Done);
        tracing::info!(
            identifiers = state.len(),
            pages = state.pages(),
            "harvest complete"
        );
        Ok(state)
    }

    async fn fetch_page(&self, state: &mut HarvestState, request: &ListRequest) -> Result<usize> {
        match self.client.list_identifiers(request).await {
            Ok(page) => Ok(state.absorb(page)),
            Err(e) => {
                let page = state.pages() + 1;
                tracing::warn!(page, error = %e, "listing page failed");
                Err(HarvestError::Page {
                    page,
                    partial: Box::new(state.clone()),
                    source: Box::new(e),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ListingPage;
    use async_trait::async_trait;
    use bibcat_rml::Source;

    /// Serves the same page forever
    #[derive(Debug)]
    struct Stuck;

    #[async_trait]
    impl ListingClient for Stuck {
        async fn list_identifiers(&self, _request: &ListRequest) -> Result<ListingPage> {
            Ok(ListingPage {
                identifiers: vec!["oai:repo:1".to_string()],
                resumption_token: Some("same".to_string()),
                complete_list_size: None,
            })
        }

        async fn get_record(&self, _identifier: &str, _prefix: &str) -> Result<Source> {
            Ok(Source::None)
        }
    }

    #[tokio::test]
    async fn test_repeated_token_stops() {
        let state = Harvester::new(Arc::new(Stuck), HarvestOptions::default())
            .harvest()
            .await
            .unwrap();
        assert_eq!(state.len(), 1);
        assert_eq!(state.pages(), 2);
        assert_eq!(state.phase(), HarvestPhase::Done);
    }

    #[tokio::test]
    async fn test_cancel_before_resumption() {
        let harvester = Harvester::new(Arc::new(Stuck), HarvestOptions::default());
        harvester.cancel_flag().cancel();
        let err = harvester.harvest().await.unwrap_err();
        match err {
            HarvestError::Cancelled { partial } => {
                assert_eq!(partial.len(), 1);
                assert_eq!(partial.pages(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
    }
}
