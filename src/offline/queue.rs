//! # Offline Action Queue
//!
//! Queues writes that must survive being offline and replays them once the
//! network is back.
//!
//! ## Features
//!
//! - **Persistent Queue**: Every enqueue rewrites the full pending list to the store
//! - **Ordered Replay**: Drains replay records in insertion order
//! - **Independent Outcomes**: A failing record never blocks the ones after it
//! - **No Lost Writes**: Enqueues and drain commits go through one writer lock
//!
//! ## Concurrency
//!
//! A drain snapshots the pending list, releases the writer lock while it
//! replays, then commits under the lock: the records it retained followed by
//! whatever was enqueued in the meantime. Drains are serialized among
//! themselves, so overlapping connectivity signals replay each record once.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use villagesync::offline::{MemoryStore, OfflineQueue};
//! use villagesync::shared::ActionRecord;
//! use villagesync::sync::{HttpTransport, NetworkMonitor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpTransport::new("http://localhost:3000".parse()?, None)?;
//! let monitor = Arc::new(NetworkMonitor::online());
//! let queue = OfflineQueue::new(Arc::new(MemoryStore::new()), Arc::new(transport), monitor);
//!
//! queue
//!     .enqueue(ActionRecord::new("vote", json!({ "projectId": "P101" }), "/api/vote"))
//!     .await?;
//!
//! let report = queue.drain().await?;
//! println!("delivered {} of {}", report.delivered(), report.attempted());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::Instrument;

use crate::offline::outcome::{DrainReport, DrainSummary, RecordOutcome};
use crate::offline::store::{open_store, ActionStore};
use crate::shared::config::AppConfig;
use crate::shared::{ActionRecord, SyncError};
use crate::sync::network_monitor::Connectivity;
use crate::sync::sync_state::{SyncState, SyncStatus};
use crate::sync::transport::{HttpTransport, ReplayTransport, StatusPolicy};

/// Offline sync queue over a persistent action store
pub struct OfflineQueue {
    store: Arc<dyn ActionStore>,
    transport: Arc<dyn ReplayTransport>,
    connectivity: Arc<dyn Connectivity>,
    policy: StatusPolicy,
    /// Guards every read-modify-write of the pending list
    write_lock: Mutex<()>,
    /// Serializes drains
    drain_lock: Mutex<()>,
    state: watch::Sender<SyncState>,
}

impl std::fmt::Debug for OfflineQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineQueue")
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// Queue statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Records currently pending
    pub pending: usize,
    /// Records delivered by the last committed drain
    pub last_delivered: usize,
    /// Records retained by the last committed drain
    pub last_retained: usize,
}

impl OfflineQueue {
    /// Create a queue over the given store, transport and connectivity signal
    pub fn new(
        store: Arc<dyn ActionStore>,
        transport: Arc<dyn ReplayTransport>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::default());
        Self {
            store,
            transport,
            connectivity,
            policy: StatusPolicy::default(),
            write_lock: Mutex::new(()),
            drain_lock: Mutex::new(()),
            state,
        }
    }

    /// Build a queue with the store and HTTP transport described by `config`
    pub async fn from_config(
        config: &AppConfig,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self, SyncError> {
        let store = open_store(config).await?;
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(store, Arc::new(transport), connectivity).with_status_policy(config.status_policy))
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.policy
    }

    /// Append a record to the persisted pending list
    ///
    /// Never touches the network. Fails only on validation or store errors,
    /// in which case the persisted list is unchanged.
    pub async fn enqueue(&self, record: ActionRecord) -> Result<(), SyncError> {
        record.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut pending = self.store.read_all().await?;
        pending.push(record);
        self.store.write_all(&pending).await?;

        if let Some(record) = pending.last() {
            tracing::debug!(key = %record.key, url = %record.url, pending = pending.len(), "Queued offline action");
        }
        Ok(())
    }

    /// Replay every pending record and keep only the ones that failed
    ///
    /// Returns immediately without touching the store when offline.
    pub async fn drain(&self) -> Result<DrainReport, SyncError> {
        if !self.connectivity.is_online() {
            tracing::debug!("Offline, skipping drain");
            return Ok(DrainReport::skipped());
        }

        let _drain = self.drain_lock.lock().await;
        // the network may have dropped while waiting behind another drain
        if !self.connectivity.is_online() {
            tracing::debug!("Went offline while waiting for a running drain, skipping drain");
            return Ok(DrainReport::skipped());
        }
        self.state.send_modify(|state| state.status = SyncStatus::Syncing);

        let report = DrainReport::begin();
        let span = tracing::info_span!("drain", batch_id = %report.batch_id);
        match self.drain_locked(report).instrument(span).await {
            Ok(report) => {
                let summary = DrainSummary::from(&report);
                self.state.send_modify(|state| {
                    state.status = SyncStatus::Completed;
                    state.last_sync = Some(report.finished_at.clone());
                    state.last_drain = Some(summary);
                    state.completed_drains += 1;
                    state.last_error = None;
                });
                Ok(report)
            }
            Err(e) => {
                tracing::error!(error = %e, "Drain failed");
                self.state.send_modify(|state| {
                    state.status = SyncStatus::Error;
                    state.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn drain_locked(&self, mut report: DrainReport) -> Result<DrainReport, SyncError> {
        let snapshot = {
            let _guard = self.write_lock.lock().await;
            self.store.read_all().await?
        };
        tracing::debug!(pending = snapshot.len(), "Drain started");

        let mut delivered = Vec::with_capacity(snapshot.len());
        for (index, record) in snapshot.iter().enumerate() {
            let outcome = self.policy.classify(self.transport.replay(record).await);
            if !outcome.is_delivered() {
                tracing::warn!(index, key = %record.key, url = %record.url, ?outcome, "Replay failed, keeping action queued");
            }
            delivered.push(outcome.is_delivered());
            report.outcomes.push(RecordOutcome::new(index, record, outcome));
        }

        {
            let _guard = self.write_lock.lock().await;
            let current = self.store.read_all().await?;
            let (next, appended) = commit_drain(&snapshot, &delivered, current);
            self.store.write_all(&next).await?;
            report.enqueued_during_drain = appended;
        }

        let report = report.finish();
        tracing::info!(
            attempted = report.attempted(),
            delivered = report.delivered(),
            retained = report.retained(),
            "Drain finished"
        );
        Ok(report)
    }

    /// Current pending records in order
    pub async fn pending(&self) -> Result<Vec<ActionRecord>, SyncError> {
        Ok(self.store.read_all().await?)
    }

    pub async fn len(&self) -> Result<usize, SyncError> {
        Ok(self.pending().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, SyncError> {
        Ok(self.len().await? == 0)
    }

    /// Drop every pending record
    pub async fn clear(&self) -> Result<usize, SyncError> {
        let _drain = self.drain_lock.lock().await;
        let _guard = self.write_lock.lock().await;
        let dropped = self.store.read_all().await?.len();
        self.store.write_all(&[]).await?;
        tracing::info!(dropped, "Cleared offline queue");
        Ok(dropped)
    }

    pub async fn stats(&self) -> Result<QueueStats, SyncError> {
        let pending = self.len().await?;
        let state = self.state();
        let (last_delivered, last_retained) = state
            .last_drain
            .map(|d| (d.delivered, d.retained))
            .unwrap_or((0, 0));
        Ok(QueueStats {
            pending,
            last_delivered,
            last_retained,
        })
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }
}

/// Compute the pending list to persist after a drain
///
/// `current` normally starts with `snapshot` followed by records enqueued
/// during the drain. If the store was changed some other way, delivered
/// records are removed from `current` by first match instead.
fn commit_drain(
    snapshot: &[ActionRecord],
    delivered: &[bool],
    current: Vec<ActionRecord>,
) -> (Vec<ActionRecord>, usize) {
    let retained = snapshot
        .iter()
        .zip(delivered)
        .filter(|(_, delivered)| !**delivered)
        .map(|(record, _)| record.clone());

    if current.len() >= snapshot.len() && current[..snapshot.len()] == *snapshot {
        let appended = current.len() - snapshot.len();
        let next = retained.chain(current.into_iter().skip(snapshot.len())).collect();
        return (next, appended);
    }

    tracing::warn!("Pending list changed outside the queue during drain, merging by record");
    let mut next = current;
    for (record, _) in snapshot.iter().zip(delivered).filter(|(_, delivered)| **delivered) {
        if let Some(pos) = next.iter().position(|r| r == record) {
            next.remove(pos);
        }
    }
    (next, 0)
}
