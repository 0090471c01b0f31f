//! # Offline Action Queue
//!
//! Lets UI collaborators record writes while offline and replays them once
//! connectivity returns.
//!
//! ## Architecture
//!
//! - **Action Queue**: `enqueue` and `drain` over the pending list
//! - **Action Store**: Durable slot holding the full pending list
//! - **Drain Outcomes**: Per-record replay results collected into a batch report
//!
//! ## Key Components
//!
//! - `queue.rs`: The queue and its drain algorithm
//! - `store/`: Store trait and memory, file and SQLite backends
//! - `outcome.rs`: Replay outcomes and drain reports

pub mod outcome;
pub mod queue;
pub mod store;

// Re-export main types
pub use outcome::{DrainReport, DrainSummary, RecordOutcome, ReplayOutcome};
pub use queue::{OfflineQueue, QueueStats};
pub use store::{open_store, ActionStore, FileStore, MemoryStore, SqliteStore};
