//! privscan - on-chain privacy exposure scanner for Solana wallets
//!
//! # WARNING
//! - Scores are heuristics. A high score does not mean a wallet is private.
//! - Compliance screening uses fixed fixture lists and carries no legal weight.
//! - Live scans send the wallet address to the configured indexer.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

// Use the library crate
use privacy_scanner::cli::commands::{self, OutputFormat};
use privacy_scanner::config::Config;

/// Solana wallet privacy scanner
#[derive(Parser)]
#[command(name = "privscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml", env = "PRIVSCAN_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a wallet's privacy exposure
    Scan {
        /// Wallet address (base58)
        address: String,

        /// Use deterministic synthetic data instead of the live indexer
        #[arg(long, conflicts_with = "transactions")]
        demo: bool,

        /// Analyze a saved JSON array of enhanced transactions
        #[arg(long, value_name = "FILE")]
        transactions: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print JSON output (implies --json)
        #[arg(long)]
        pretty: bool,
    },

    /// Screen a single address against sanctions and flag lists
    Screen {
        /// Address to screen (base58)
        address: String,
    },

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (logging format depends on it)
    let config = Config::load(&cli.config);
    init_tracing(config.as_ref().map(|c| c.logging.json).unwrap_or(false));

    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Scan {
            address,
            demo,
            transactions,
            json,
            pretty,
        } => {
            let format = if pretty {
                OutputFormat::PrettyJson
            } else if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            commands::scan(&config, &address, demo, transactions.as_deref(), format).await
        }
        Commands::Screen { address } => commands::screen(&config, &address).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Install the tracing subscriber; logs go to stderr so stdout stays clean
fn init_tracing(json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("privacy_scanner=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
