//! # Sync State Management
//!
//! Observable status of an offline queue, published through a `watch`
//! channel so UIs and tests can follow drains as they happen.

use serde::Serialize;

use crate::offline::outcome::DrainSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No drain has run yet
    Idle,
    /// A drain is replaying records
    Syncing,
    /// The last drain committed its result
    Completed,
    /// The last drain failed to read or write the store
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncState {
    pub status: SyncStatus,
    /// RFC 3339 time of the last committed drain
    pub last_sync: Option<String>,
    pub last_drain: Option<DrainSummary>,
    /// Drains that committed, skipped ones excluded
    pub completed_drains: u64,
    pub last_error: Option<String>,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            status: SyncStatus::Idle,
            last_sync: None,
            last_drain: None,
            completed_drains: 0,
            last_error: None,
        }
    }
}
