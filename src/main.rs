//! # Catalog Harness CLI (`catalog`)
//!
//! Inspect configured product sources and try the matching pipeline against
//! them from a terminal.
//!
//! ## Usage
//!
//! ```bash
//! catalog --config ./config/catalog.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog sources` | List sources and their connection health |
//! | `catalog fetch <source>` | Fetch one page of products as JSON |
//! | `catalog count <source>` | Print the source's product count |
//! | `catalog search <source> "<query>"` | Rank the source's catalog for a query |
//! | `catalog classify "<message>"` | Print the intent of a shopper message |
//! | `catalog detect-mapping <file>` | Guess a schema mapping from a sample file |
//!
//! ## Examples
//!
//! ```bash
//! # Check every source answers
//! catalog sources
//!
//! # Second page of 50 from a REST source
//! catalog fetch storefront --limit 50 --offset 50
//!
//! # Rank the primary catalog
//! catalog search main "navy wool coat under $200"
//!
//! # No config needed
//! catalog classify "I'd like to open a ticket"
//! catalog detect-mapping ./feed.tsv --delimiter $'\t'
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use catalog_harness::config::{self, LogFormat, LoggingConfig};
use catalog_harness::{fetch, inspect, search, sources};

/// Catalog Harness CLI: product source adapters and rule-based matching.
///
/// Commands that talk to sources read them from the `--config` TOML file.
/// See `config/catalog.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "catalog",
    about = "Catalog Harness: product source adapters and rule-based matching",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured sources and whether they answer.
    Sources,

    /// Fetch one page of products from a source and print it as JSON.
    Fetch {
        /// Source name (the `<name>` in `[sources.<name>]`).
        source: String,

        /// Page size. Defaults to `[search].fetch_limit`.
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Opaque cursor from a previous page's `nextCursor`.
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Print a source's total product count, or "unknown".
    Count { source: String },

    /// Load a source through the cache and rank it for a query.
    Search {
        source: String,

        query: String,

        /// Print the full outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Classify a shopper message. Does not read the config.
    Classify { message: String },

    /// Auto-detect a schema mapping from a CSV/TSV or JSON sample. Does not
    /// read the config.
    DetectMapping {
        file: PathBuf,

        /// Field delimiter for delimited files.
        #[arg(long, default_value = ",")]
        delimiter: String,

        /// The file has no header row.
        #[arg(long)]
        no_header: bool,
    },
}

/// Install the stderr subscriber. `RUST_LOG` wins over `[logging].level`.
fn init_tracing(logging: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.level.as_str().into());

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = match logging.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .boxed(),
    };
    subscriber.with(fmt_layer).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Commands that don't require config
    match &cli.command {
        Commands::Classify { message } => {
            init_tracing(&LoggingConfig::default());
            return inspect::run_classify(message);
        }
        Commands::DetectMapping {
            file,
            delimiter,
            no_header,
        } => {
            init_tracing(&LoggingConfig::default());
            return inspect::run_detect_mapping(file, delimiter, !no_header);
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.logging);

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Fetch {
            source,
            limit,
            offset,
            cursor,
        } => {
            fetch::run_fetch(&cfg, &source, limit, offset, cursor).await?;
        }
        Commands::Count { source } => {
            fetch::run_count(&cfg, &source).await?;
        }
        Commands::Search {
            source,
            query,
            json,
        } => {
            search::run_search(&cfg, &source, &query, json).await?;
        }
        Commands::Classify { .. } | Commands::DetectMapping { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
