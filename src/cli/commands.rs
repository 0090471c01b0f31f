//! Subcommand handlers
//!
//! Each handler opens the queue described by the configuration, runs one
//! operation and returns its result; `main` only parses arguments and prints.

use std::sync::Arc;

use villagesync::offline::{DrainReport, OfflineQueue};
use villagesync::shared::{ActionRecord, AppConfig};
use villagesync::sync::{ConnectivityProbe, NetworkMonitor, NetworkStatus, SyncTrigger};

pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Arguments of `villagesync enqueue`
#[derive(Debug, Clone)]
pub struct EnqueueArgs {
    pub key: String,
    pub url: String,
    pub method: Option<String>,
    /// JSON payload text
    pub data: String,
}

/// Queue a record and return the number now pending
pub async fn enqueue(config: &AppConfig, args: EnqueueArgs) -> CliResult<usize> {
    let (queue, _) = open_queue(config, NetworkStatus::Offline).await?;
    let data = serde_json::from_str(&args.data)?;
    let mut record = ActionRecord::new(args.key, data, args.url);
    if let Some(method) = args.method {
        record = record.with_method(method);
    }
    queue.enqueue(record).await?;
    Ok(queue.len().await?)
}

pub async fn list(config: &AppConfig) -> CliResult<Vec<ActionRecord>> {
    let (queue, _) = open_queue(config, NetworkStatus::Offline).await?;
    Ok(queue.pending().await?)
}

/// Run one drain pass, treating the network as online unless `offline`
pub async fn drain(config: &AppConfig, offline: bool) -> CliResult<DrainReport> {
    let status = if offline {
        NetworkStatus::Offline
    } else {
        NetworkStatus::Online
    };
    let (queue, _) = open_queue(config, status).await?;
    Ok(queue.drain().await?)
}

pub async fn clear(config: &AppConfig) -> CliResult<usize> {
    let (queue, _) = open_queue(config, NetworkStatus::Offline).await?;
    Ok(queue.clear().await?)
}

/// Probe the API and drain on every reconnect until Ctrl-C
pub async fn watch(config: &AppConfig) -> CliResult<()> {
    let (queue, monitor) = open_queue(config, NetworkStatus::Offline).await?;
    let probe = ConnectivityProbe::from_config(config)?;
    tracing::info!(url = %probe.url(), "Watching API connectivity");

    let _probe = probe.spawn(monitor.clone());
    let subscription = SyncTrigger::subscribe(Arc::new(queue), &monitor, config.drain_on_start);

    tokio::signal::ctrl_c().await?;
    subscription.unsubscribe();
    tracing::info!("Stopped watching");
    Ok(())
}

async fn open_queue(
    config: &AppConfig,
    status: NetworkStatus,
) -> CliResult<(OfflineQueue, Arc<NetworkMonitor>)> {
    let monitor = Arc::new(NetworkMonitor::new(status));
    let queue = OfflineQueue::from_config(config, monitor.clone()).await?;
    Ok((queue, monitor))
}
