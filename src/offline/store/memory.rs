//! In-memory action store.
//!
//! Holds the raw slot text rather than decoded records so reads go through the
//! same decoding as the durable backends and tests can seed corrupted slots.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{decode_slot, encode_slot, ActionStore};
use crate::shared::{ActionRecord, StoreError};

/// Action store kept in process memory, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: RwLock<Option<String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store whose slot has never been written
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose slot already holds `raw`
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: RwLock::new(Some(raw.into())),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Current raw slot contents
    pub async fn raw(&self) -> Option<String> {
        self.slot.read().await.clone()
    }

    /// Make every subsequent write fail, leaving the slot untouched
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActionStore for MemoryStore {
    async fn read_all(&self) -> Result<Vec<ActionRecord>, StoreError> {
        Ok(self
            .slot
            .read()
            .await
            .as_deref()
            .map(decode_slot)
            .unwrap_or_default())
    }

    async fn write_all(&self, records: &[ActionRecord]) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("memory store is rejecting writes".to_string()));
        }
        let raw = encode_slot(records)?;
        *self.slot.write().await = Some(raw);
        Ok(())
    }
}
