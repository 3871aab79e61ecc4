//! OAI-PMH repository access

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use bibcat_remote::{with_retry, RemoteError, RetryPolicy};
use bibcat_rml::Source;
use reqwest::Client;

use crate::error::Result;
use crate::protocol::{parse_list_identifiers, parse_response};
use crate::state::ListingPage;

/// A `ListIdentifiers` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// First page, optionally scoped to a set
    Initial {
        metadata_prefix: String,
        set: Option<String>,
    },
    /// A later page
    Resume { token: String },
}

impl ListRequest {
    /// Query parameters, `verb` included
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = vec![("verb", "ListIdentifiers")];
        match self {
            ListRequest::Initial {
                metadata_prefix,
                set,
            } => {
                params.push(("metadataPrefix", metadata_prefix.as_str()));
                if let Some(set) = set {
                    params.push(("set", set.as_str()));
                }
            }
            ListRequest::Resume { token } => params.push(("resumptionToken", token.as_str())),
        }
        params
    }
}

/// A record-listing repository
#[async_trait]
pub trait ListingClient: Debug + Send + Sync {
    async fn list_identifiers(&self, request: &ListRequest) -> Result<ListingPage>;

    /// The `GetRecord` response for `identifier`, parsed as a source document
    async fn get_record(&self, identifier: &str, metadata_prefix: &str) -> Result<Source>;
}

/// OAI-PMH over HTTP GET
#[derive(Debug, Clone)]
pub struct HttpOaiClient {
    endpoint: String,
    http: Client,
    retry: RetryPolicy,
}

impl HttpOaiClient {
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

    async fn fetch_once(&self, params: &[(&str, &str)]) -> bibcat_remote::Result<String> {
        let resp = self.http.get(&self.endpoint).query(params).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn fetch(&self, what: &str, params: &[(&str, &str)]) -> Result<String> {
        let body = with_retry(&self.retry, what, || self.fetch_once(params)).await?;
        Ok(body)
    }
}

#[async_trait]
impl ListingClient for HttpOaiClient {
    async fn list_identifiers(&self, request: &ListRequest) -> Result<ListingPage> {
        let body = self.fetch("oai ListIdentifiers", &request.params()).await?;
        let page = parse_list_identifiers(&body)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            identifiers = page.identifiers.len(),
            more = page.resumption_token.is_some(),
            "listed identifiers"
        );
        Ok(page)
    }

    async fn get_record(&self, identifier: &str, metadata_prefix: &str) -> Result<Source> {
        let params = [
            ("verb", "GetRecord"),
            ("identifier", identifier),
            ("metadataPrefix", metadata_prefix),
        ];
        let body = self.fetch("oai GetRecord", &params).await?;
        let doc = parse_response(&body)?;
        tracing::trace!(identifier, bytes = body.len(), "fetched record");
        Ok(Source::Xml(doc))
    }
}
