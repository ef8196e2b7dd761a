//! VSL CLI - developer tooling for the VSL player
//!
//! - Storage key derivation for a source URL
//! - Rendition ladder inspection and quality resolution for HLS masters
//! - Resume window checks for positions and saved progress records

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod output;

/// VSL CLI - inspect what the player would do with a source
#[derive(Parser)]
#[command(name = "vsl-cli")]
#[command(version)]
#[command(about = "Inspect storage keys, quality ladders and resume decisions for the VSL player", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, table)
    #[arg(short, long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the localStorage key used for a source
    Key {
        /// Video source URL
        src: String,

        /// Explicit key, as passed through `persistenceKey`
        #[arg(short, long)]
        persistence_key: Option<String>,
    },

    /// List the rendition ladder of an HLS master playlist
    Levels {
        /// URL or path to the master playlist
        manifest: String,

        /// Quality preference to resolve (auto, high, medium, low, 720p, 480)
        #[arg(short, long, default_value = "auto")]
        quality: String,
    },

    /// Check whether a position would be offered for resume
    Check {
        /// Saved position (seconds or M:SS)
        #[arg(short, long, required_unless_present = "record")]
        position: Option<String>,

        /// Duration (seconds or M:SS)
        #[arg(short, long, required_unless_present = "record")]
        duration: Option<String>,

        /// Saved progress record (JSON, as written to localStorage)
        #[arg(short, long, conflicts_with_all = ["position", "duration"])]
        record: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Key { src, persistence_key } => {
            commands::key(&src, persistence_key, &cli.format)?;
        }
        Commands::Levels { manifest, quality } => {
            commands::levels(&manifest, &quality, &cli.format).await?;
        }
        Commands::Check { position, duration, record } => {
            let input = match record {
                Some(path) => commands::CheckInput::Record(path),
                None => commands::CheckInput::Position {
                    position: position.unwrap_or_default(),
                    duration: duration.unwrap_or_default(),
                },
            };
            commands::check(input, &cli.format)?;
        }
    }

    Ok(())
}
