mod cli;
mod config;
mod content;
mod db;
mod error;
mod memory;
mod server;
mod tools;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mnemo", version, about = "Persistent memory MCP server for AI agents")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from config, stdio by default)
    Serve,
    /// Search memories from the terminal
    Search {
        /// Natural language query
        query: String,
        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,
        /// Boost keyword (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,
    },
    /// Print a database health report
    Doctor,
    /// Rebuild the search index from the metadata tables
    Reindex,
    /// Merge search index segments
    Optimize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::MnemoConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for MCP JSON-RPC.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => match config.server.transport.as_str() {
            "http" | "sse" => server::serve_sse(config).await?,
            _ => server::serve_stdio(config).await?,
        },
        Command::Search {
            query,
            limit,
            keywords,
        } => {
            cli::search::search(&config, &query, limit, &keywords)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
        Command::Reindex => {
            cli::maintenance::reindex(&config)?;
        }
        Command::Optimize => {
            cli::maintenance::optimize(&config)?;
        }
    }

    Ok(())
}
