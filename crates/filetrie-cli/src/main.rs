//! filetrie: fingerprints and file keys from the command line.
//!
//! ```text
//! filetrie fingerprint a.jpg b.jpg              # one line per file
//! filetrie --json fingerprint a.jpg             # JSON array
//! filetrie file-key --owner 0x.. --bucket 0x.. --location photos/a.jpg a.jpg
//! filetrie config                               # effective configuration
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use filetrie_types::BucketId;
use tracing::debug;

use crate::config::{CliConfig, OutputFormat};

#[derive(Parser)]
#[command(name = "filetrie", version, about = "Content fingerprints and file keys")]
struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Override the configured log level.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint one or more files.
    Fingerprint {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Files read at the same time.
        #[arg(short = 'j', long)]
        max_concurrent: Option<usize>,
    },

    /// Fingerprint a file and derive its file key.
    FileKey {
        /// Owner account, hex.
        #[arg(long)]
        owner: String,

        /// Bucket id, 32 bytes of hex.
        #[arg(long)]
        bucket: BucketId,

        /// Location of the file within the bucket.
        #[arg(long)]
        location: String,

        path: PathBuf,
    },

    /// Print the effective configuration.
    Config,
}

fn setup_tracing(level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("filetrie={level}").parse()?),
        )
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load().context("failed to load config")?;

    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if cli.json {
        config.output.format = OutputFormat::Json;
    }
    setup_tracing(&config.logging.level).context("invalid log level")?;
    debug!(?config, "configuration loaded");

    let format = config.output.format;
    match cli.command {
        Commands::Fingerprint {
            paths,
            max_concurrent,
        } => {
            let max_concurrent =
                max_concurrent.unwrap_or(config.fingerprint.max_concurrent_files);
            filetrie_storage::engine().await?;
            commands::fingerprint::run(paths, max_concurrent, format).await
        }
        Commands::FileKey {
            owner,
            bucket,
            location,
            path,
        } => commands::file_key::run(&owner, bucket, &location, &path, format).await,
        Commands::Config => commands::show_config(&config, format),
    }
}
