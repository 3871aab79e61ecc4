mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use config::BibcatFileConfig;
use error::exit_with_error;

fn init_tracing(cli: &Cli) {
    // --quiet silences everything; --verbose shows info unless RUST_LOG says
    // otherwise; the default honours RUST_LOG and falls back to warnings.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("off")
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "info".into())
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
    };

    let ansi = !(cli.no_color || std::env::var_os("NO_COLOR").is_some());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        exit_with_error(e);
    }
}

async fn run(cli: Cli) -> error::CliResult<()> {
    let file = BibcatFileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Transform {
            input,
            rules,
            format,
            base_iri,
            vars,
            triplestore,
            dedup,
            load,
            output,
        } => {
            let args = commands::transform::TransformArgs {
                input: &input,
                rules: &rules,
                format,
                base_iri: base_iri.as_deref(),
                vars: &vars,
                triplestore: triplestore.as_deref(),
                dedup: dedup.as_deref(),
                load,
                output: output.as_deref(),
            };
            commands::transform::run(args, &file).await
        }

        Commands::Harvest {
            endpoint,
            metadata_prefix,
            set,
            sample,
            seed,
            rules,
            concurrency,
            base_iri,
            triplestore,
            dedup,
            load,
            output,
        } => {
            let args = commands::harvest::HarvestArgs {
                endpoint: endpoint.as_deref(),
                metadata_prefix: metadata_prefix.as_deref(),
                set: set.as_deref(),
                sample,
                seed,
                rules: &rules,
                concurrency,
                base_iri: base_iri.as_deref(),
                triplestore: triplestore.as_deref(),
                dedup: dedup.as_deref(),
                load,
                output: output.as_deref(),
            };
            commands::harvest::run(args, &file).await
        }

        Commands::Check { rules } => commands::check::run(&rules),
    }
}
