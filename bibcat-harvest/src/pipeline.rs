//! Fetching and transforming harvested records

use std::sync::Arc;

use bibcat_graph_ir::Graph;
use bibcat_remote::TripleStore;
use bibcat_rml::{CompiledMapping, Context, EngineConfig, Executor};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::client::ListingClient;
use crate::error::{HarvestError, Result};
use crate::harvester::CancelFlag;

/// Records fetched and transformed at once, by default
pub const DEFAULT_CONCURRENCY: usize = 8;

/// A record that could not be fetched or transformed
#[derive(Debug)]
pub struct RecordFailure {
    pub identifier: String,
    pub error: HarvestError,
}

/// Outcome of a batch transform
#[derive(Debug, Default)]
pub struct TransformReport {
    pub succeeded: usize,
    pub failed: Vec<RecordFailure>,
    /// Identifiers never dispatched because the run was cancelled
    pub cancelled: Vec<String>,
    /// Every successful record's triples, merged in identifier order
    pub graph: Graph,
}

impl TransformReport {
    pub fn failed_identifiers(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.identifier.as_str()).collect()
    }
}

/// Dereferences identifiers and runs a compiled mapping over each record
///
/// Every record is transformed into its own graph by a separate task; the
/// graphs are merged afterwards in the order the identifiers were given,
/// with each record's blank nodes relabelled under `r{index}_`.
#[derive(Debug)]
pub struct RecordPipeline {
    client: Arc<dyn ListingClient>,
    mapping: Arc<CompiledMapping>,
    config: Arc<EngineConfig>,
    store: Option<Arc<dyn TripleStore>>,
    metadata_prefix: String,
    concurrency: usize,
    cancel: CancelFlag,
}

impl RecordPipeline {
    pub fn new(
        client: Arc<dyn ListingClient>,
        mapping: Arc<CompiledMapping>,
        config: Arc<EngineConfig>,
        metadata_prefix: impl Into<String>,
    ) -> Self {
        Self {
            client,
            mapping,
            config,
            store: None,
            metadata_prefix: metadata_prefix.into(),
            concurrency: DEFAULT_CONCURRENCY,
            cancel: CancelFlag::new(),
        }
    }

    /// Store used by bindings maps in the mapping
    pub fn with_store(mut self, store: Arc<dyn TripleStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn run(&self, identifiers: &[String]) -> TransformReport {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set: JoinSet<(usize, Result<Graph>)> = JoinSet::new();
        let mut report = TransformReport::default();

        let mut dispatched = 0;
        for (index, identifier) in identifiers.iter().enumerate() {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            if self.cancel.is_cancelled() {
                drop(permit);
                break;
            }
            dispatched += 1;

            let client = self.client.clone();
            let mapping = self.mapping.clone();
            let config = self.config.clone();
            let store = self.store.clone();
            let prefix = self.metadata_prefix.clone();
            let identifier = identifier.clone();
            join_set.spawn(async move {
                let _permit = permit;
                let result =
                    transform_record(client, &mapping, &config, store, &identifier, &prefix).await;
                (index, result)
            });
        }
        report.cancelled = identifiers[dispatched..].to_vec();
        if !report.cancelled.is_empty() {
            tracing::info!(cancelled = report.cancelled.len(), "record dispatch cancelled");
        }

        let mut results: Vec<Option<Result<Graph>>> = (0..dispatched).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, result)) => results[index] = Some(result),
                Err(e) => tracing::error!(error = %e, "record worker did not finish"),
            }
        }

        for (index, result) in results.into_iter().enumerate() {
            let identifier = identifiers[index].clone();
            match result {
                Some(Ok(graph)) => {
                    report.graph.merge_scoped(graph, &format!("r{index}_"));
                    report.succeeded += 1;
                }
                Some(Err(error)) => {
                    tracing::warn!(identifier = %identifier, error = %error, "record failed");
                    report.failed.push(RecordFailure { identifier, error });
                }
                None => report.failed.push(RecordFailure {
                    identifier,
                    error: HarvestError::Worker("task aborted".to_string()),
                }),
            }
        }

        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed.len(),
            triples = report.graph.len(),
            "batch transform complete"
        );
        report
    }
}

async fn transform_record(
    client: Arc<dyn ListingClient>,
    mapping: &CompiledMapping,
    config: &EngineConfig,
    store: Option<Arc<dyn TripleStore>>,
    identifier: &str,
    metadata_prefix: &str,
) -> Result<Graph> {
    let source = client.get_record(identifier, metadata_prefix).await?;
    let ctx = Context::new().with("identifier", identifier);
    let mut executor = Executor::new(mapping, config);
    if let Some(store) = store {
        executor = executor.with_store(store);
    }
    executor.run(&source, &ctx).await?;
    tracing::debug!(identifier, triples = executor.graph().len(), "record transformed");
    Ok(executor.into_graph())
}
