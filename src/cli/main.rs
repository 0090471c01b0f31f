/**
 * villagesync command line
 *
 * Inspect and drive an offline action queue from a shell: queue a record,
 * list what is pending, force a drain, clear the queue, or watch the API and
 * drain automatically whenever it becomes reachable.
 */
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use villagesync::shared::{AppConfig, StoreKind};

use commands::EnqueueArgs;

#[derive(Debug, Parser)]
#[command(name = "villagesync", version, about = "Offline action queue for the village infrastructure API")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured store backend (file, sqlite, memory)
    #[arg(long, global = true)]
    store: Option<StoreKind>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Queue an action for replay
    Enqueue {
        #[arg(long)]
        key: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        method: Option<String>,
        /// JSON payload
        #[arg(long, default_value = "null")]
        data: String,
    },
    /// Print pending actions as JSON
    List,
    /// Replay pending actions once
    Drain {
        /// Treat the network as offline (the drain becomes a no-op)
        #[arg(long)]
        offline: bool,
    },
    /// Drop every pending action
    Clear,
    /// Probe the API and drain whenever it becomes reachable
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(kind) = cli.store {
        config.store.kind = kind;
    }

    match cli.command {
        Command::Enqueue { key, url, method, data } => {
            let pending = commands::enqueue(&config, EnqueueArgs { key, url, method, data }).await?;
            println!("{} pending", pending);
        }
        Command::List => {
            println!("{}", serde_json::to_string_pretty(&commands::list(&config).await?)?);
        }
        Command::Drain { offline } => {
            let report = commands::drain(&config, offline).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Clear => {
            let dropped = commands::clear(&config).await?;
            println!("cleared {} pending", dropped);
        }
        Command::Watch => commands::watch(&config).await?,
    }

    Ok(())
}
