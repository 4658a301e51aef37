//! GeneScope CLI
//!
//! Searches several gene expression and annotation services at once and
//! prints each source's results in its own section.

mod config;
mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::GenescopeConfig;
use genescope_core::{DATA_SOURCES, Error, SearchOutcome};
use genescope_egress::dataset_expression::find_dataset;
use genescope_search::{Aggregator, BlockingSearch, MemoizedSearch};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "genescope")]
#[command(about = "GeneScope - search gene expression across public databases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "GENESCOPE_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every source for a gene symbol, synonym or Ensembl ID
    Search {
        query: String,

        /// Print the raw outcome as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Fetch one BioGPS dataset for one gene
    Dataset {
        /// Dataset ID, e.g. GSE1133
        dataset_id: String,

        /// NCBI gene ID, e.g. 3559
        gene_id: String,

        /// Print the raw outcome as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
    /// Read queries from stdin, one per line
    Interactive,
    /// List the databases GeneScope reads from
    Sources,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => {
            let path = shellexpand::tilde(path).to_string();
            GenescopeConfig::from_file(&path)?
        }
        None => GenescopeConfig::default(),
    };

    // Merge environment variables (they override config file)
    config.merge_env();

    // CLI flag has the highest precedence
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging.level)?;
    debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Search { query, json } => {
            let search = build_search(&config)?;
            let outcome = search.search(&query)?;
            print_outcome(&outcome, json, |out| render::render_search(out, &query, &outcome))?;
        }
        Commands::Dataset {
            dataset_id,
            gene_id,
            json,
        } => {
            if find_dataset(&dataset_id).is_none() {
                warn!("Dataset '{}' is not in the supported list", dataset_id);
            }
            let search = build_search(&config)?;
            let outcome = search.search_dataset(&dataset_id, &gene_id)?;
            print_outcome(&outcome, json, |out| {
                render::render_dataset(out, &dataset_id, &gene_id, &outcome)
            })?;
        }
        Commands::Interactive => {
            let search = build_search(&config)?;
            run_interactive(&search)?;
        }
        Commands::Sources => print_sources()?,
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for `--json`
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let mut filter = EnvFilter::new(level.to_lowercase());

    // Connection-level chatter from the HTTP stack is rarely useful
    for directive in ["hyper_util=warn", "reqwest=warn"] {
        match directive.parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Warning: Failed to set log filter '{}': {}", directive, e),
        }
    }

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_search(config: &GenescopeConfig) -> anyhow::Result<BlockingSearch> {
    let aggregator = Aggregator::from_config(config.http.clone(), &config.sources)
        .context("Failed to set up sources")?;
    info!("Configured sources: {:?}", aggregator.source_names());

    let search = BlockingSearch::new(MemoizedSearch::new(Arc::new(aggregator)))
        .context("Failed to start async runtime")?;
    Ok(search)
}

fn print_outcome<F>(outcome: &SearchOutcome, json: bool, render: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>,
{
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, outcome)?;
        writeln!(out)?;
    } else {
        render(&mut out)?;
    }
    Ok(())
}

fn run_interactive(search: &BlockingSearch) -> anyhow::Result<()> {
    eprintln!("Enter a gene symbol, synonym or Ensembl ID (e.g. IL2RA). Type 'quit' to exit.");

    let mut stdin = io::stdin().lock();
    let mut line = String::new();
    loop {
        print!("genescope> ");
        io::stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if matches!(query, "quit" | "exit") {
            break;
        }

        match search.search(query) {
            Ok(outcome) => {
                let mut out = io::stdout().lock();
                render::render_search(&mut out, query, &outcome)?;
                writeln!(out)?;
            }
            Err(Error::EmptyQuery) => eprintln!("[warn] Please enter a gene name"),
            Err(e) => eprintln!("[error] {}", e),
        }
    }

    info!("Served {} distinct queries", search.inner().cached_queries());
    Ok(())
}

fn print_sources() -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{:<26} {:<10} URL", "Database", "Version")?;
    for info in DATA_SOURCES {
        writeln!(out, "{:<26} {:<10} {}", info.name, info.version, info.url)?;
        for dataset in info.datasets {
            writeln!(out, "    - {}", dataset)?;
        }
    }
    Ok(())
}
