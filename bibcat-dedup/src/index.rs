//! Per-run candidate cache

use std::collections::HashMap;

use crate::candidates::{Candidate, CandidateSource, DedupKey};

/// Candidates per key, loaded lazily and extended with identifiers minted
/// during the run
///
/// Minted identifiers are kept per class only, so an entity with a second
/// type still sees what was minted for its class.
#[derive(Debug, Default)]
pub struct DedupIndex {
    loaded: HashMap<DedupKey, Vec<Candidate>>,
    minted: HashMap<String, Vec<Candidate>>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates for `label`, consulting `source` at most once per key when
    /// it is cacheable
    pub async fn candidates(
        &mut self,
        source: &dyn CandidateSource,
        key: &DedupKey,
        label: &str,
    ) -> bibcat_remote::Result<Vec<Candidate>> {
        let mut out = if source.cacheable() {
            if !self.loaded.contains_key(key) {
                let fetched = source.candidates(key, label).await?;
                self.loaded.insert(key.clone(), fetched);
            }
            self.loaded.get(key).cloned().unwrap_or_default()
        } else {
            source.candidates(key, label).await?
        };

        if let Some(minted) = self.minted.get(&key.class) {
            out.extend(minted.iter().cloned());
        }
        Ok(out)
    }

    /// Remember an identifier minted for entities of `class`
    pub fn record_minted(&mut self, class: &str, candidate: Candidate) {
        let minted = self.minted.entry(class.to_string()).or_default();
        if !minted.contains(&candidate) {
            minted.push(candidate);
        }
    }

    /// Keys whose candidates have been fetched
    pub fn loaded_keys(&self) -> usize {
        self.loaded.len()
    }
}
