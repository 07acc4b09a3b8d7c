//! # Catalog Sync CLI (`catalog-sync`)
//!
//! ## Usage
//!
//! ```bash
//! catalog-sync --config ./config/catalog-sync.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog-sync serve` | Start the webhook server |
//! | `catalog-sync sign <file>` | Print the webhook signature of a payload file |
//! | `catalog-sync preview <topic> <file>` | Print the index request a payload would produce |

use anyhow::Result;
use catalog_sync::config::{load_config, load_config_or_default};
use catalog_sync::logging::{init_tracing, LogFormat};
use catalog_sync::webhook::Topic;
use catalog_sync::{preview, server, sign};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Catalog Sync: mirrors commerce-platform product webhooks into a
/// multimodal search index.
#[derive(Parser)]
#[command(
    name = "catalog-sync",
    about = "Catalog Sync: signed product webhooks into a multimodal search index",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Secrets are read from the environment variables named in the file
    /// (`SHOPIFY_WEBHOOK_SECRET` and `MARQO_API_KEY` by default).
    #[arg(long, global = true, default_value = "./config/catalog-sync.toml")]
    config: PathBuf,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server.
    ///
    /// Binds to `[server].bind` and serves the product webhook routes and
    /// the liveness probe until interrupted.
    Serve {
        /// Log index requests instead of sending them.
        #[arg(long)]
        simulate: bool,
    },

    /// Print the base64 HMAC-SHA256 signature of a payload file.
    ///
    /// Uses the configured webhook secret. Works without a config file.
    Sign {
        /// Payload file; signed byte-for-byte.
        file: PathBuf,
    },

    /// Print the index request a delivery would produce, without sending it.
    ///
    /// Works without a config file.
    Preview {
        /// Notification type: `create`, `update`, or `delete`.
        #[arg(value_parser = parse_topic)]
        topic: Topic,

        /// JSON payload file.
        file: PathBuf,
    },
}

fn parse_topic(s: &str) -> Result<Topic, String> {
    Topic::parse(s).ok_or_else(|| format!("unknown topic '{}': expected create, update, or delete", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Commands::Serve { simulate } => {
            let mut cfg = load_config(&cli.config)?;
            if simulate {
                cfg.index.simulate = true;
            }
            server::run_server(&cfg).await?;
        }
        Commands::Sign { file } => {
            let cfg = load_config_or_default(&cli.config)?;
            sign::run_sign(&cfg, &file)?;
        }
        Commands::Preview { topic, file } => {
            let cfg = load_config_or_default(&cli.config)?;
            preview::run_preview(&cfg, topic, &file)?;
        }
    }

    Ok(())
}
