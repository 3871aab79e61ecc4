//! Accumulated listing state

use std::collections::HashSet;

use rand::Rng;
use serde::Serialize;

/// Where a harvest is in its pagination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HarvestPhase {
    #[default]
    Start,
    Listing,
    Resuming,
    Done,
}

/// One page of a `ListIdentifiers` response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub identifiers: Vec<String>,
    /// Absent, or empty in the response, on the last page
    pub resumption_token: Option<String>,
    pub complete_list_size: Option<usize>,
}

/// Identifiers gathered so far, in first-seen order without repeats
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarvestState {
    identifiers: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
    resumption_token: Option<String>,
    total_expected: Option<usize>,
    pages: usize,
    phase: HarvestPhase,
}

impl HarvestState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `identifier`; returns false if it was already known
    pub fn add(&mut self, identifier: impl Into<String>) -> bool {
        let identifier = identifier.into();
        if self.seen.contains(&identifier) {
            return false;
        }
        self.seen.insert(identifier.clone());
        self.identifiers.push(identifier);
        true
    }

    /// Fold a listing page in; returns how many identifiers were new
    pub fn absorb(&mut self, page: ListingPage) -> usize {
        self.pages += 1;
        let added = page
            .identifiers
            .into_iter()
            .filter(|id| self.add(id.as_str()))
            .count();
        self.resumption_token = page.resumption_token;
        if page.complete_list_size.is_some() {
            self.total_expected = page.complete_list_size;
        }
        added
    }

    /// A token is present and the declared total, if any, is not reached
    pub fn should_resume(&self) -> bool {
        self.resumption_token.is_some() && !self.reached_total()
    }

    pub fn reached_total(&self) -> bool {
        self.total_expected
            .is_some_and(|total| self.identifiers.len() >= total)
    }

    /// Keep a uniformly random `size` identifiers, preserving their order
    pub fn sample<R: Rng + ?Sized>(&mut self, size: usize, rng: &mut R) {
        if self.identifiers.len() <= size {
            return;
        }
        let mut keep = rand::seq::index::sample(rng, self.identifiers.len(), size).into_vec();
        keep.sort_unstable();
        let identifiers: Vec<String> = keep
            .into_iter()
            .map(|i| std::mem::take(&mut self.identifiers[i]))
            .collect();
        self.seen = identifiers.iter().cloned().collect();
        self.identifiers = identifiers;
    }

    pub(crate) fn set_phase(&mut self, phase: HarvestPhase) {
        self.phase = phase;
    }

    pub fn phase(&self) -> HarvestPhase {
        self.phase
    }

    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    pub fn into_identifiers(self) -> Vec<String> {
        self.identifiers
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn resumption_token(&self) -> Option<&str> {
        self.resumption_token.as_deref()
    }

    pub fn total_expected(&self) -> Option<usize> {
        self.total_expected
    }

    /// Listing pages absorbed so far
    pub fn pages(&self) -> usize {
        self.pages
    }
}
