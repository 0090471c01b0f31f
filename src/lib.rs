//! villagesync - Offline Action Queue
//!
//! villagesync keeps the writes of a village-infrastructure front-end (votes,
//! issue reports, maintenance logs) alive while the device is offline and
//! replays them against the REST backend once connectivity returns.
//!
//! # Module Structure
//!
//! - **`shared`** - Types used everywhere
//!   - The action record
//!   - Error types
//!   - Application configuration
//!
//! - **`offline`** - The queue itself
//!   - `enqueue` / `drain` over a persisted pending list
//!   - Memory, file and SQLite stores
//!   - Per-record drain outcomes
//!
//! - **`sync`** - Connectivity and replay
//!   - Network monitor and connectivity probe
//!   - HTTP replay transport and status policy
//!   - Sync trigger with an explicit unsubscribe
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use villagesync::offline::OfflineQueue;
//! use villagesync::shared::{ActionRecord, AppConfig};
//! use villagesync::sync::{NetworkMonitor, SyncTrigger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! let monitor = Arc::new(NetworkMonitor::offline());
//! let queue = Arc::new(OfflineQueue::from_config(&config, monitor.clone()).await?);
//!
//! // drains automatically on every offline -> online transition
//! let _subscription = SyncTrigger::subscribe(queue.clone(), &monitor, config.drain_on_start);
//!
//! queue
//!     .enqueue(ActionRecord::new("issue", json!({ "text": "Street light out" }), "/api/issue"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - Store failures propagate as [`shared::SyncError`] and leave the
//!   persisted list as it was
//! - Replay failures never propagate; the record stays queued and the failure
//!   shows up in the [`offline::DrainReport`]
//! - Corrupted store contents read as an empty queue

/// Shared types and data structures
pub mod shared;

/// Offline action queue and stores
pub mod offline;

/// Connectivity, replay transport and triggers
pub mod sync;
