//! # Drain Outcomes
//!
//! Every drain produces a `DrainReport` listing the outcome of each replay
//! attempt in pending order. The retained set is exactly the records whose
//! outcome is `Failed`.

use serde::Serialize;
use uuid::Uuid;

use crate::shared::ActionRecord;

/// Result of replaying a single record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReplayOutcome {
    /// The request completed and the record was dropped from the queue
    Delivered {
        /// HTTP status of the response
        status: u16,
    },
    /// The record stays queued for the next drain
    Failed {
        /// Why the replay did not count as delivered
        reason: String,
    },
}

impl ReplayOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ReplayOutcome::Delivered { .. })
    }
}

/// Outcome of one record within a drain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordOutcome {
    /// Position of the record in the pending list when the drain started
    pub index: usize,
    pub key: String,
    pub url: String,
    #[serde(flatten)]
    pub outcome: ReplayOutcome,
}

impl RecordOutcome {
    pub fn new(index: usize, record: &ActionRecord, outcome: ReplayOutcome) -> Self {
        Self {
            index,
            key: record.key.clone(),
            url: record.url.clone(),
            outcome,
        }
    }
}

/// Batch outcome of a drain
#[derive(Debug, Clone, Serialize)]
pub struct DrainReport {
    /// Correlates log lines of one drain
    pub batch_id: Uuid,
    /// RFC 3339 start time
    pub started_at: String,
    /// RFC 3339 finish time
    pub finished_at: String,
    /// The drain returned early because the network was offline
    pub skipped_offline: bool,
    /// Per-record outcomes in pending order
    pub outcomes: Vec<RecordOutcome>,
    /// Records enqueued while the drain was replaying, kept after the retained ones
    pub enqueued_during_drain: usize,
}

impl DrainReport {
    pub(crate) fn begin() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            batch_id: Uuid::new_v4(),
            started_at: now.clone(),
            finished_at: now,
            skipped_offline: false,
            outcomes: Vec::new(),
            enqueued_during_drain: 0,
        }
    }

    pub(crate) fn skipped() -> Self {
        Self {
            skipped_offline: true,
            ..Self::begin()
        }
    }

    pub(crate) fn finish(mut self) -> Self {
        self.finished_at = chrono::Utc::now().to_rfc3339();
        self
    }

    /// Number of records a replay was attempted for
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_delivered()).count()
    }

    /// Number of attempted records kept for the next drain
    pub fn retained(&self) -> usize {
        self.attempted() - self.delivered()
    }

    /// Outcomes of the records that stayed queued
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| !o.outcome.is_delivered())
    }
}

/// Compact view of a finished drain kept in the sync state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    pub batch_id: Uuid,
    pub finished_at: String,
    pub attempted: usize,
    pub delivered: usize,
    pub retained: usize,
}

impl From<&DrainReport> for DrainSummary {
    fn from(report: &DrainReport) -> Self {
        Self {
            batch_id: report.batch_id,
            finished_at: report.finished_at.clone(),
            attempted: report.attempted(),
            delivered: report.delivered(),
            retained: report.retained(),
        }
    }
}
