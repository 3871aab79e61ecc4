use std::path::{Path, PathBuf};

use bibcat_rml::{Context, Executor, Source};

use crate::cli::InputFormat;
use crate::commands::{load_into, load_mapping, maybe_dedup, triplestore};
use crate::config::BibcatFileConfig;
use crate::error::{CliError, CliResult};
use crate::output::write_graph;

pub struct TransformArgs<'a> {
    pub input: &'a Path,
    pub rules: &'a [PathBuf],
    pub format: Option<InputFormat>,
    pub base_iri: Option<&'a str>,
    pub vars: &'a [String],
    pub triplestore: Option<&'a str>,
    pub dedup: Option<&'a [String]>,
    pub load: bool,
    pub output: Option<&'a Path>,
}

pub fn read_source(path: &Path, format: Option<InputFormat>) -> CliResult<Source> {
    let format = format
        .or_else(|| InputFormat::from_extension(path))
        .ok_or_else(|| {
            CliError::Usage(format!(
                "cannot tell the format of {}; pass --format",
                path.display()
            ))
        })?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("{}: {e}", path.display())))?;
    let source = match format {
        InputFormat::Xml => Source::from_xml_str(&text)?,
        InputFormat::Json => Source::from_json_str(&text)?,
        InputFormat::Csv => Source::from_delimited(&text, ',')?,
        InputFormat::Tsv => Source::from_delimited(&text, '\t')?,
    };
    Ok(source)
}

pub async fn run(args: TransformArgs<'_>, file: &BibcatFileConfig) -> CliResult<()> {
    if args.load && file.triplestore_url(args.triplestore).is_none() {
        return Err(CliError::Usage("--load needs a triplestore".into()));
    }

    let mapping = load_mapping(args.rules)?;
    let engine = file.engine_config(args.base_iri, args.vars)?;
    let store = triplestore(file, args.triplestore)?;
    let source = read_source(args.input, args.format)?;

    let mut executor = Executor::new(&mapping, &engine);
    if let Some(store) = &store {
        executor = executor.with_store(store.clone());
    }
    executor.run(&source, &Context::new()).await?;
    let stats = executor.stats().clone();
    let graph = executor.into_graph();
    tracing::info!(
        rows = stats.rows,
        skipped = stats.rows_skipped,
        triples = graph.len(),
        "transformed {}",
        args.input.display()
    );

    let graph = maybe_dedup(graph, args.dedup, &mapping, &engine, file, store.as_ref()).await?;
    if args.load {
        if let Some(store) = &store {
            load_into(store.as_ref(), &graph, file.load_chunk()).await?;
        }
    }
    write_graph(&graph, args.output)
}
