use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use carrel::{cli, config};

#[derive(Parser)]
#[command(name = "carrel", version, about = "Literature-review workspace for a thesis carrel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a card for every snapshot paper that has none
    Sync {
        /// Cap on new cards this run
        #[arg(long)]
        limit: Option<String>,
        /// Analyze new papers with the configured provider
        #[arg(long)]
        enrich: bool,
        /// Actually write cards (default is a dry run)
        #[arg(long)]
        write: bool,
    },
    /// Rebuild the index documents from the card store
    Index,
    /// Assemble a paragraph bank and citation trace
    Cite {
        /// Comma-separated terms boosting evidence sentences
        #[arg(long)]
        focus: Option<String>,
        /// Section label for the output files
        #[arg(long)]
        section: Option<String>,
        /// Maximum paragraphs in the bank
        #[arg(long)]
        max: Option<String>,
        /// Drop cards scoring below this
        #[arg(long)]
        min_relevance: Option<String>,
    },
    /// Screen a database-export CSV before importing anything
    Screen {
        /// Path to the export CSV
        csv: PathBuf,
        /// Refine verdicts with the configured provider
        #[arg(long)]
        enrich: bool,
        /// Save the report and JSON verdicts
        #[arg(long)]
        write: bool,
    },
    /// Show card store statistics
    Stats,
    /// Check the workspace layout and report problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for the workspace root and log level)
    let config = config::CarrelConfig::load()?;

    // Initialize tracing with the configured log level.
    // Log to stderr so stdout stays clean for reports.
    let filter = EnvFilter::try_new(&config.workspace.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Sync { limit, enrich, write } => {
            cli::sync::sync(&config, limit.as_deref(), enrich, write).await?;
        }
        Command::Index => {
            cli::index::index(&config)?;
        }
        Command::Cite {
            focus,
            section,
            max,
            min_relevance,
        } => {
            cli::cite::cite(
                &config,
                focus.as_deref(),
                section.as_deref(),
                max.as_deref(),
                min_relevance.as_deref(),
            )?;
        }
        Command::Screen { csv, enrich, write } => {
            cli::screen::screen(&config, &csv, enrich, write).await?;
        }
        Command::Stats => {
            cli::stats::stats(&config)?;
        }
        Command::Doctor => {
            cli::doctor::doctor(&config)?;
        }
    }

    Ok(())
}
