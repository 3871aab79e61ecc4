//! Triplestore client
//!
//! Queries are POSTed form-encoded as `{query, format: "json"}`, updates as
//! `{update}`, the way Blazegraph-style SPARQL endpoints expect them.

use crate::backoff::{with_retry, RetryPolicy};
use crate::error::{RemoteError, Result};
use crate::results::{Binding, SparqlResults};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use std::time::Duration;

/// A SPARQL endpoint
#[async_trait]
pub trait TripleStore: Debug + Send + Sync {
    /// Run a SELECT query and return its solution rows
    async fn query(&self, sparql: &str) -> Result<Vec<Binding>>;

    /// Run a SPARQL update
    async fn update(&self, sparql: &str) -> Result<()>;
}

/// HTTP SPARQL endpoint client
#[derive(Debug, Clone)]
pub struct HttpTripleStore {
    endpoint: String,
    http: Client,
    retry: RetryPolicy,
}

impl HttpTripleStore {
    /// Create a client with a hard per-request `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Client(e.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            http,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn query_once(&self, sparql: &str) -> Result<Vec<Binding>> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header("Accept", "application/sparql-results+json")
            .form(&[("query", sparql), ("format", "json")])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let results: SparqlResults = serde_json::from_str(&body).map_err(|e| {
            RemoteError::InvalidResponse(format!("not a SPARQL JSON result document: {e}"))
        })?;
        Ok(results.results.bindings)
    }

    async fn update_once(&self, sparql: &str) -> Result<()> {
        let resp = self
            .http
            .post(&self.endpoint)
            .form(&[("update", sparql)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl TripleStore for HttpTripleStore {
    async fn query(&self, sparql: &str) -> Result<Vec<Binding>> {
        let rows = with_retry(&self.retry, "sparql query", || self.query_once(sparql)).await?;
        tracing::debug!(endpoint = %self.endpoint, rows = rows.len(), "sparql query");
        Ok(rows)
    }

    async fn update(&self, sparql: &str) -> Result<()> {
        with_retry(&self.retry, "sparql update", || self.update_once(sparql)).await?;
        tracing::debug!(endpoint = %self.endpoint, bytes = sparql.len(), "sparql update");
        Ok(())
    }
}
