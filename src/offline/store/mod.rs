//! # Persistent Action Store
//!
//! Durable storage for the pending action list. The whole list lives in one
//! named slot as a JSON array and is always read and written in full.
//!
//! ## Backends
//!
//! - `memory.rs`: in-process slot for tests and ephemeral queues
//! - `file.rs`: JSON slot file replaced atomically on every write
//! - `sqlite.rs`: slot row in a local SQLite database
//!
//! ## Corrupted slots
//!
//! Reading never fails because of slot contents. A slot that is not a JSON
//! array reads as empty; array elements that are not records are skipped.

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::shared::config::{AppConfig, StoreKind};
use crate::shared::{ActionRecord, StoreError};

/// Storage for the full pending action list
///
/// Implementations must be `Send + Sync + 'static` so a queue can share them
/// across tasks.
#[async_trait]
pub trait ActionStore: Send + Sync + 'static {
    /// Read the pending list in insertion order; empty if never written
    async fn read_all(&self) -> Result<Vec<ActionRecord>, StoreError>;

    /// Replace the pending list in a single storage operation
    async fn write_all(&self, records: &[ActionRecord]) -> Result<(), StoreError>;
}

/// Open the store selected by `config`
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn ActionStore>, StoreError> {
    let store: Arc<dyn ActionStore> = match config.store.kind {
        StoreKind::File => Arc::new(FileStore::open(config.store_path()).await?),
        StoreKind::Sqlite => {
            Arc::new(SqliteStore::open(config.store_path(), config.store.slot.clone()).await?)
        }
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    tracing::debug!(kind = ?config.store.kind, "Opened action store");
    Ok(store)
}

/// Decode raw slot text into records
pub(crate) fn decode_slot(raw: &str) -> Vec<ActionRecord> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => {
            tracing::warn!(kind = value_kind(&other), "Offline queue slot is not an array, treating as empty");
            return Vec::new();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Offline queue slot is not valid JSON, treating as empty");
            return Vec::new();
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ActionRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping malformed action record");
            }
        }
    }
    records
}

/// Encode records for the slot
pub(crate) fn encode_slot(records: &[ActionRecord]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(records)?)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
