//! # Network Monitor
//!
//! Tracks online/offline status and notifies subscribers of transitions.
//!
//! ## Features
//!
//! - **Connectivity Detection**: Current online/offline status
//! - **Real-time Updates**: `watch` subscribers see every status change
//! - **Reconnect Counting**: Every offline to online move bumps a counter, so a
//!   subscriber that wakes late still sees how many reconnects it missed
//!
//! The queue only depends on the [`Connectivity`] capability, so tests can
//! drive it with a monitor they flip by hand.

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Offline,
}

impl NetworkStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, NetworkStatus::Online)
    }
}

/// Value published to monitor subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivitySignal {
    pub status: NetworkStatus,
    /// Offline to online transitions since the monitor was created
    pub reconnects: u64,
}

/// Reports whether the network is currently reachable
pub trait Connectivity: Send + Sync + 'static {
    fn is_online(&self) -> bool;
}

/// Holds the current network status and broadcasts changes
#[derive(Debug)]
pub struct NetworkMonitor {
    signal: watch::Sender<ConnectivitySignal>,
}

impl NetworkMonitor {
    pub fn new(initial: NetworkStatus) -> Self {
        let (signal, _) = watch::channel(ConnectivitySignal {
            status: initial,
            reconnects: 0,
        });
        Self { signal }
    }

    pub fn online() -> Self {
        Self::new(NetworkStatus::Online)
    }

    pub fn offline() -> Self {
        Self::new(NetworkStatus::Offline)
    }

    pub fn status(&self) -> NetworkStatus {
        self.signal.borrow().status
    }

    /// Number of offline to online transitions seen so far
    pub fn reconnects(&self) -> u64 {
        self.signal.borrow().reconnects
    }

    /// Update the status, returning whether it changed
    ///
    /// Subscribers are only woken on an actual change.
    pub fn set_status(&self, status: NetworkStatus) -> bool {
        let changed = self.signal.send_if_modified(|current| {
            if current.status == status {
                return false;
            }
            if status.is_online() {
                current.reconnects += 1;
            }
            current.status = status;
            true
        });
        if changed {
            tracing::info!(?status, reconnects = self.reconnects(), "Network status changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectivitySignal> {
        self.signal.subscribe()
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::offline()
    }
}

impl Connectivity for NetworkMonitor {
    fn is_online(&self) -> bool {
        self.status().is_online()
    }
}
