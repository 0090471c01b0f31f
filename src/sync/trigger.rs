//! # Sync Trigger
//!
//! Drains an offline queue every time the network comes back.
//!
//! `SyncTrigger::subscribe` spawns a task watching a [`NetworkMonitor`] and
//! returns a [`SyncSubscription`]. The task drains on each offline to online
//! transition until the subscription is unsubscribed or dropped. It follows
//! the monitor's reconnect counter rather than comparing statuses, so a
//! reconnect that happens before the task wakes, or while a drain is running,
//! still causes a drain. Several reconnects missed at once cause one drain.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::offline::{DrainReport, OfflineQueue};
use crate::shared::SyncError;
use crate::sync::network_monitor::{ConnectivitySignal, NetworkMonitor};

/// Wires a queue to a connectivity signal
pub struct SyncTrigger;

impl SyncTrigger {
    /// Start draining `queue` whenever `monitor` goes online
    ///
    /// With `drain_on_start`, one drain also runs right away if the monitor is
    /// already online.
    pub fn subscribe(
        queue: Arc<OfflineQueue>,
        monitor: &NetworkMonitor,
        drain_on_start: bool,
    ) -> SyncSubscription {
        let mut rx = monitor.subscribe();
        // reconnects are counted from the signal at subscribe time
        let initial = *rx.borrow_and_update();
        let drain_now = drain_on_start && initial.status.is_online();
        let task_queue = Arc::clone(&queue);
        let handle = tokio::spawn(async move {
            Self::watch_loop(task_queue, rx, initial.reconnects, drain_now).await;
        });
        SyncSubscription {
            queue,
            handle: Some(handle),
        }
    }

    async fn watch_loop(
        queue: Arc<OfflineQueue>,
        mut rx: watch::Receiver<ConnectivitySignal>,
        mut seen: u64,
        drain_now: bool,
    ) {
        if drain_now {
            Self::run_drain(&queue).await;
        }

        while rx.changed().await.is_ok() {
            let signal = *rx.borrow_and_update();
            if signal.reconnects <= seen {
                continue;
            }
            seen = signal.reconnects;
            if signal.status.is_online() {
                tracing::info!(reconnects = signal.reconnects, "Connectivity restored, draining offline queue");
                Self::run_drain(&queue).await;
            }
        }
        tracing::debug!("Network monitor dropped, sync trigger exiting");
    }

    async fn run_drain(queue: &OfflineQueue) {
        // store failures are already recorded in the queue's sync state
        if let Err(e) = queue.drain().await {
            tracing::error!(error = %e, "Triggered drain failed");
        }
    }
}

/// Handle to a running sync trigger
///
/// Dropping the handle stops the trigger.
pub struct SyncSubscription {
    queue: Arc<OfflineQueue>,
    handle: Option<JoinHandle<()>>,
}

impl SyncSubscription {
    /// Drain now, independent of connectivity transitions
    pub async fn sync_now(&self) -> Result<DrainReport, SyncError> {
        self.queue.drain().await
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop reacting to connectivity changes
    ///
    /// A drain already in progress is aborted at its next suspension point;
    /// records it had not committed stay queued.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Sync trigger unsubscribed");
        }
    }
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SyncSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSubscription")
            .field("active", &self.is_active())
            .finish()
    }
}
