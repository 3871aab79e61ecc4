//! Where canonical entities come from
//!
//! [`TriplestoreCandidates`] lists every labelled entity of a class from the
//! shared triple store; [`LocSuggestSource`] asks the id.loc.gov suggest
//! service for each label.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bibcat_remote::{with_retry, RemoteError, RetryPolicy, TripleStore};
use bibcat_vocab::{bf, rdf, rdfs, schema};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Cache key: the class being resolved plus an optional second class the
/// entity also carries (`bf:Agent` + `bf:Person`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DedupKey {
    pub class: String,
    pub agent_class: Option<String>,
}

impl DedupKey {
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            agent_class: None,
        }
    }

    pub fn with_agent_class(mut self, agent_class: impl Into<String>) -> Self {
        self.agent_class = Some(agent_class.into());
        self
    }
}

/// An existing entity and its label
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub iri: String,
    pub label: String,
}

impl Candidate {
    pub fn new(iri: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            label: label.into(),
        }
    }
}

/// A source of canonical entities
#[async_trait]
pub trait CandidateSource: Debug + Send + Sync {
    /// Candidates for `label` among entities matching `key`
    async fn candidates(
        &self,
        key: &DedupKey,
        label: &str,
    ) -> bibcat_remote::Result<Vec<Candidate>>;

    /// Whether results depend only on `key`, so one lookup serves every label
    fn cacheable(&self) -> bool {
        true
    }
}

/// Default predicates read as an entity's label
pub fn default_label_predicates() -> Vec<String> {
    vec![
        rdfs::LABEL.to_string(),
        rdf::VALUE.to_string(),
        schema::NAME.to_string(),
    ]
}

/// Candidates from the shared triple store
#[derive(Debug, Clone)]
pub struct TriplestoreCandidates {
    store: Arc<dyn TripleStore>,
    label_predicates: Vec<String>,
}

impl TriplestoreCandidates {
    pub fn new(store: Arc<dyn TripleStore>) -> Self {
        Self {
            store,
            label_predicates: default_label_predicates(),
        }
    }

    pub fn with_label_predicates(mut self, predicates: Vec<String>) -> Self {
        self.label_predicates = predicates;
        self
    }

    /// SELECT listing `?iri ?label` for every entity of the key's classes
    pub fn query_for(&self, key: &DedupKey) -> String {
        let path = self
            .label_predicates
            .iter()
            .map(|p| format!("<{p}>"))
            .collect::<Vec<_>>()
            .join("|");
        let agent = key
            .agent_class
            .as_ref()
            .map(|c| format!(" ?iri a <{c}> ."))
            .unwrap_or_default();
        format!(
            "SELECT DISTINCT ?iri ?label WHERE {{ ?iri a <{}> .{agent} \
             ?iri {path} ?label . FILTER(isIRI(?iri)) }}",
            key.class
        )
    }
}

#[async_trait]
impl CandidateSource for TriplestoreCandidates {
    async fn candidates(
        &self,
        key: &DedupKey,
        _label: &str,
    ) -> bibcat_remote::Result<Vec<Candidate>> {
        let rows = self.store.query(&self.query_for(key)).await?;
        let candidates: Vec<Candidate> = rows
            .iter()
            .filter_map(|row| {
                let iri = row.get("iri").filter(|v| v.is_uri())?;
                let label = row.get("label")?;
                Some(Candidate::new(&iri.value, label.value.trim()))
            })
            .collect();
        tracing::debug!(
            class = %key.class,
            candidates = candidates.len(),
            "loaded dedup candidates"
        );
        Ok(candidates)
    }
}

/// The id.loc.gov suggest service
///
/// Each class maps to an authority scheme (`authorities/names`,
/// `authorities/subjects`); classes without a scheme get no candidates.
#[derive(Debug, Clone)]
pub struct LocSuggestSource {
    base_url: String,
    http: Client,
    retry: RetryPolicy,
    schemes: BTreeMap<String, String>,
}

impl LocSuggestSource {
    pub const DEFAULT_BASE_URL: &'static str = "https://id.loc.gov";

    pub fn new(base_url: impl Into<String>, timeout: Duration) -> bibcat_remote::Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;

        let schemes = [
            (bf::AGENT, "authorities/names"),
            (bf::PERSON, "authorities/names"),
            (bf::ORGANIZATION, "authorities/names"),
            (bf::TOPIC, "authorities/subjects"),
        ]
        .into_iter()
        .map(|(class, scheme)| (class.to_string(), scheme.to_string()))
        .collect();

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            retry: RetryPolicy::default(),
            schemes,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_scheme(mut self, class: impl Into<String>, scheme: impl Into<String>) -> Self {
        self.schemes.insert(class.into(), scheme.into());
        self
    }

    fn scheme_for(&self, key: &DedupKey) -> Option<&str> {
        key.agent_class
            .as_ref()
            .and_then(|c| self.schemes.get(c))
            .or_else(|| self.schemes.get(&key.class))
            .map(String::as_str)
    }

    async fn suggest_once(&self, url: &str, label: &str) -> bibcat_remote::Result<Vec<Candidate>> {
        let resp = self.http.get(url).query(&[("q", label)]).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        parse_suggestions(&body)
    }
}

#[async_trait]
impl CandidateSource for LocSuggestSource {
    async fn candidates(
        &self,
        key: &DedupKey,
        label: &str,
    ) -> bibcat_remote::Result<Vec<Candidate>> {
        let Some(scheme) = self.scheme_for(key) else {
            return Ok(Vec::new());
        };
        let url = format!("{}/{}/suggest/", self.base_url, scheme);
        let candidates =
            with_retry(&self.retry, "loc suggest", || self.suggest_once(&url, label)).await?;
        tracing::debug!(scheme, label, candidates = candidates.len(), "loc suggest");
        Ok(candidates)
    }

    fn cacheable(&self) -> bool {
        false
    }
}

/// OpenSearch suggestions: `[query, [labels], [descriptions], [uris]]`
fn parse_suggestions(body: &str) -> bibcat_remote::Result<Vec<Candidate>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| RemoteError::InvalidResponse(format!("suggest response is not JSON: {e}")))?;
    let parts = value
        .as_array()
        .filter(|parts| parts.len() >= 4)
        .ok_or_else(|| {
            RemoteError::InvalidResponse("unexpected suggest response shape".to_string())
        })?;

    let strings = |v: &Value| -> Vec<String> {
        v.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    };
    let labels = strings(&parts[1]);
    let uris = strings(&parts[3]);

    Ok(labels
        .into_iter()
        .zip(uris)
        .map(|(label, iri)| Candidate::new(iri, label))
        .collect())
}
