//! Cardex CLI - command line interface for the card catalog

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use cardex_storage::SqliteStore;
use commands::{completions, filters, search, serve, show};
use config::Config;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "cardex")]
#[command(author, version, about = "Trading-card catalog browser and search service")]
pub struct Cli {
    /// Config file path (default: the platform config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file path (overrides the config file)
    #[arg(short, long, global = true)]
    pub db: Option<PathBuf>,

    /// Output format: plain, json
    #[arg(short, long, default_value = "plain", global = true)]
    pub format: String,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from(self.format.as_str())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(serve::ServeArgs),
    /// Search the card catalog
    Search(search::SearchArgs),
    /// Show one card with attacks, abilities, and related cards
    Show(show::ShowArgs),
    /// List the filter options the catalog currently offers
    Filters,
    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Application context with the catalog store
pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub config: Config,
}

impl AppContext {
    pub fn new(cli: &Cli) -> anyhow::Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        let db_path = cli.db.clone().unwrap_or_else(|| config.db_path.clone());

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!("Using database at: {:?}", db_path);

        let store = SqliteStore::open(&db_path)?;

        Ok(Self {
            store: Arc::new(store),
            config,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    tracing::debug!("Starting cardex CLI");

    // Completions need no catalog; everything else opens the database.
    if let Commands::Completions(args) = &cli.command {
        return completions::run(args);
    }

    let ctx = AppContext::new(&cli)?;

    match &cli.command {
        Commands::Serve(args) => serve::run(args, &ctx).await?,
        Commands::Search(args) => search::run(args, &cli, &ctx).await?,
        Commands::Show(args) => show::run(args, &cli, &ctx).await?,
        Commands::Filters => filters::run(&cli, &ctx).await?,
        Commands::Completions(_) => {}
    }

    Ok(())
}
