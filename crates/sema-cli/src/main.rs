//! Sema CLI - Document ingestion and semantic retrieval

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sema - ingest documents, search them by meaning
#[derive(Parser)]
#[command(name = "sema")]
#[command(version)]
#[command(about = "Document ingestion and semantic retrieval", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize sema (create config, blob directory and index)
    Init,

    /// Ingest files or directories into the corpus
    Ingest {
        /// Files or directories to ingest
        paths: Vec<String>,

        /// Show what would be ingested without actually ingesting
        #[arg(long)]
        dry_run: bool,
    },

    /// Search the corpus by meaning
    Query {
        /// Query text
        query: String,

        /// Maximum results
        #[arg(short = 'k', long, default_value = "5")]
        top_k: usize,

        /// Show full document content instead of a snippet
        #[arg(long)]
        full: bool,
    },

    /// Show corpus size and backend reachability
    Status,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sema=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sema=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Ingest { paths, dry_run } => commands::ingest::run(&paths, dry_run),
        Commands::Query {
            query,
            top_k,
            full,
        } => commands::query::run(&query, top_k, full),
        Commands::Status => commands::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
