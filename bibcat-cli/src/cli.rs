use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bibcat", about = "BIBCAT bibliographic RDF mapping", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file (defaults to ./bibcat.toml when present)
    #[arg(long, global = true, env = "BIBCAT_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map a local file to N-Triples
    Transform {
        /// Input document
        input: PathBuf,

        /// RML rule files (Turtle); repeatable
        #[arg(long, short = 'r', required = true)]
        rules: Vec<PathBuf>,

        /// Input format (detected from the file extension when omitted)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,

        /// Base IRI for minted identifiers
        #[arg(long)]
        base_iri: Option<String>,

        /// Named template value, `name=value`; repeatable
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// Triplestore SPARQL endpoint for bindings maps, dedup and --load
        #[arg(long)]
        triplestore: Option<String>,

        /// Deduplicate entities of these classes (mapping's dedup classes when empty)
        #[arg(long, num_args = 0.., value_name = "CLASS_IRI")]
        dedup: Option<Vec<String>>,

        /// Push the result into the triplestore
        #[arg(long)]
        load: bool,

        /// Write N-Triples here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// List an OAI-PMH repository and optionally transform its records
    Harvest {
        /// OAI-PMH endpoint URL
        #[arg(long)]
        endpoint: Option<String>,

        /// Metadata prefix to list
        #[arg(long)]
        metadata_prefix: Option<String>,

        /// Restrict the listing to one set
        #[arg(long)]
        set: Option<String>,

        /// Keep a random sample of this many identifiers
        #[arg(long)]
        sample: Option<usize>,

        /// Seed for sampling
        #[arg(long)]
        seed: Option<u64>,

        /// RML rule files; when given, every record is transformed
        #[arg(long, short = 'r')]
        rules: Vec<PathBuf>,

        /// Records fetched and transformed at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Base IRI for minted identifiers
        #[arg(long)]
        base_iri: Option<String>,

        /// Triplestore SPARQL endpoint for bindings maps, dedup and --load
        #[arg(long)]
        triplestore: Option<String>,

        /// Deduplicate entities of these classes (mapping's dedup classes when empty)
        #[arg(long, num_args = 0.., value_name = "CLASS_IRI")]
        dedup: Option<Vec<String>>,

        /// Push the result into the triplestore
        #[arg(long)]
        load: bool,

        /// Write output here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Compile rules and print their triples maps
    Check {
        /// RML rule files (Turtle)
        #[arg(required = true)]
        rules: Vec<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Xml,
    Json,
    Csv,
    Tsv,
}

impl InputFormat {
    /// Guess from a file extension
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xml" | "mods" | "marcxml" => Some(InputFormat::Xml),
            "json" | "jsonld" => Some(InputFormat::Json),
            "csv" => Some(InputFormat::Csv),
            "tsv" | "tab" | "txt" => Some(InputFormat::Tsv),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::path::Path;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_extension(Path::new("r.XML")), Some(InputFormat::Xml));
        assert_eq!(InputFormat::from_extension(Path::new("r.tsv")), Some(InputFormat::Tsv));
        assert_eq!(InputFormat::from_extension(Path::new("r")), None);
    }

    #[test]
    fn test_dedup_flag_without_classes() {
        let cli = Cli::parse_from(["bibcat", "transform", "in.xml", "-r", "rules.ttl", "--dedup"]);
        match cli.command {
            Commands::Transform { dedup, .. } => assert_eq!(dedup, Some(Vec::new())),
            _ => panic!("expected transform"),
        }
    }
}
