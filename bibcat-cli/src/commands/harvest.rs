use std::path::{Path, PathBuf};
use std::sync::Arc;

use bibcat_harvest::{CancelFlag, Harvester, HttpOaiClient, ListingClient, RecordPipeline};

use crate::commands::{load_into, load_mapping, maybe_dedup, triplestore};
use crate::config::BibcatFileConfig;
use crate::error::{CliError, CliResult};
use crate::output::{write_graph, write_text};

pub struct HarvestArgs<'a> {
    pub endpoint: Option<&'a str>,
    pub metadata_prefix: Option<&'a str>,
    pub set: Option<&'a str>,
    pub sample: Option<usize>,
    pub seed: Option<u64>,
    pub rules: &'a [PathBuf],
    pub concurrency: Option<usize>,
    pub base_iri: Option<&'a str>,
    pub triplestore: Option<&'a str>,
    pub dedup: Option<&'a [String]>,
    pub load: bool,
    pub output: Option<&'a Path>,
}

/// List identifiers; with rules, transform every record
///
/// Ctrl-C stops the listing before its next page and the pipeline before
/// its next record.
pub async fn run(args: HarvestArgs<'_>, file: &BibcatFileConfig) -> CliResult<()> {
    if args.rules.is_empty() && (args.dedup.is_some() || args.load) {
        return Err(CliError::Usage(
            "--dedup and --load need --rules to produce a graph".into(),
        ));
    }
    if args.load && file.triplestore_url(args.triplestore).is_none() {
        return Err(CliError::Usage("--load needs a triplestore".into()));
    }

    let endpoint = file.harvest_endpoint(args.endpoint)?;
    let client: Arc<dyn ListingClient> = Arc::new(
        HttpOaiClient::new(endpoint.clone(), file.harvest_timeout())?
            .with_retry(file.retry_policy()),
    );
    let options = file.harvest_options(args.metadata_prefix, args.set, args.sample, args.seed);
    let metadata_prefix = options.metadata_prefix.clone();

    let cancel = CancelFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; stopping at the next boundary");
            on_interrupt.cancel();
        }
    });

    let state = Harvester::new(client.clone(), options)
        .with_cancel(cancel.clone())
        .harvest()
        .await?;
    tracing::info!(endpoint = %endpoint, identifiers = state.len(), "listing done");

    if args.rules.is_empty() {
        let mut text = state.identifiers().join("\n");
        text.push('\n');
        return write_text(&text, args.output);
    }

    let mapping = Arc::new(load_mapping(args.rules)?);
    let engine = Arc::new(file.engine_config(args.base_iri, &[])?);
    let store = triplestore(file, args.triplestore)?;

    let mut pipeline = RecordPipeline::new(client, mapping.clone(), engine.clone(), metadata_prefix)
        .with_concurrency(file.harvest_concurrency(args.concurrency))
        .with_cancel(cancel);
    if let Some(store) = &store {
        pipeline = pipeline.with_store(store.clone());
    }
    let report = pipeline.run(state.identifiers()).await;

    for failure in &report.failed {
        eprintln!("failed: {} ({})", failure.identifier, failure.error);
    }
    eprintln!(
        "{} records transformed, {} failed, {} not attempted",
        report.succeeded,
        report.failed.len(),
        report.cancelled.len()
    );

    let graph = maybe_dedup(
        report.graph,
        args.dedup,
        &mapping,
        &engine,
        file,
        store.as_ref(),
    )
    .await?;
    if args.load {
        if let Some(store) = &store {
            load_into(store.as_ref(), &graph, file.load_chunk()).await?;
        }
    }
    write_graph(&graph, args.output)
}
