pub mod check;
pub mod harvest;
pub mod transform;

use std::path::PathBuf;
use std::sync::Arc;

use bibcat_dedup::{CandidateSource, Deduplicator, LocSuggestSource, TriplestoreCandidates};
use bibcat_graph_ir::Graph;
use bibcat_remote::{insert_data, HttpTripleStore, TripleStore};
use bibcat_rml::{CompiledMapping, EngineConfig, RmlLoader};

use crate::config::{BibcatFileConfig, CandidateSourceKind};
use crate::error::{CliError, CliResult};

/// Read and compile every rule file as one rule graph
pub fn load_mapping(rules: &[PathBuf]) -> CliResult<CompiledMapping> {
    let mut documents = Vec::with_capacity(rules.len());
    for path in rules {
        let text = std::fs::read_to_string(path)
            .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
        documents.push(text);
    }
    let loader = RmlLoader::from_turtle_documents(documents.iter().map(String::as_str))?;
    let mapping = loader.compile()?;
    tracing::info!(maps = mapping.len(), files = rules.len(), "compiled rules");
    Ok(mapping)
}

pub fn triplestore(
    file: &BibcatFileConfig,
    url: Option<&str>,
) -> CliResult<Option<Arc<dyn TripleStore>>> {
    let Some(url) = file.triplestore_url(url) else {
        return Ok(None);
    };
    let store =
        HttpTripleStore::new(url, file.triplestore_timeout())?.with_retry(file.retry_policy());
    Ok(Some(Arc::new(store)))
}

/// Deduplicate when `--dedup` was passed
///
/// Explicit classes win; otherwise the file's `[dedup].classes`, then the
/// classes the mapping flags with `kds:dedup`.
pub async fn maybe_dedup(
    graph: Graph,
    flag: Option<&[String]>,
    mapping: &CompiledMapping,
    engine: &EngineConfig,
    file: &BibcatFileConfig,
    store: Option<&Arc<dyn TripleStore>>,
) -> CliResult<Graph> {
    let Some(flag) = flag else {
        return Ok(graph);
    };
    let fallback = mapping.dedup_classes().into_iter().map(str::to_string).collect();
    let classes = file.dedup_classes(flag, fallback);
    if classes.is_empty() {
        tracing::warn!("--dedup given but no classes to deduplicate");
        return Ok(graph);
    }

    let source: Arc<dyn CandidateSource> = match file.candidate_source() {
        CandidateSourceKind::Triplestore => {
            let store = store.cloned().ok_or_else(|| {
                CliError::Usage(
                    "--dedup needs a triplestore (--triplestore or [triplestore].url)".into(),
                )
            })?;
            let mut candidates = TriplestoreCandidates::new(store);
            if let Some(predicates) = file.dedup.as_ref().and_then(|d| d.label_predicates.clone()) {
                candidates = candidates.with_label_predicates(predicates);
            }
            Arc::new(candidates)
        }
        CandidateSourceKind::Loc { base_url } => Arc::new(
            LocSuggestSource::new(base_url, file.triplestore_timeout())?
                .with_retry(file.retry_policy()),
        ),
    };

    let mut dedup = Deduplicator::new(source, file.dedup_config(engine));
    let (graph, report) = dedup.deduplicate(graph, &classes).await?;
    if !report.failed.is_empty() {
        tracing::warn!(
            failed = report.failed.len(),
            "some entities could not be resolved and were left as is"
        );
    }
    Ok(graph)
}

/// Push `graph` into the store in `INSERT DATA` chunks
pub async fn load_into(store: &dyn TripleStore, graph: &Graph, chunk: usize) -> CliResult<()> {
    let requests = insert_data(graph, chunk);
    for (n, update) in requests.iter().enumerate() {
        store.update(update).await?;
        tracing::debug!(chunk = n + 1, of = requests.len(), "loaded chunk");
    }
    tracing::info!(triples = graph.len(), "loaded graph into triplestore");
    Ok(())
}
