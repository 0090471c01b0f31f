//! # Connectivity and Replay
//!
//! Everything the offline queue needs from the outside world.
//!
//! ## Architecture
//!
//! - **Network Monitor**: Online/offline status with change notifications
//! - **Transport**: Sends a queued record to its endpoint
//! - **Trigger**: Drains the queue when connectivity is restored
//! - **Probe**: Polls the API to feed the network monitor
//! - **Sync State**: Observable status of the queue

pub mod network_monitor;
pub mod probe;
pub mod sync_state;
pub mod transport;
pub mod trigger;

pub use network_monitor::{Connectivity, ConnectivitySignal, NetworkMonitor, NetworkStatus};
pub use probe::{ConnectivityProbe, ProbeHandle};
pub use sync_state::{SyncState, SyncStatus};
pub use transport::{HttpTransport, ReplayResponse, ReplayTransport, StatusPolicy};
pub use trigger::{SyncSubscription, SyncTrigger};
