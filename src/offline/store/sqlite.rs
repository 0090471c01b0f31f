//! # SQLite Action Store
//!
//! Keeps the pending list as one row of a key/value table in a local SQLite
//! database. Each slot name maps to a row, so several queues can share a file.
//!
//! ## Schema
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS kv_slots (
//!     name TEXT PRIMARY KEY,
//!     value TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::{decode_slot, encode_slot, ActionStore};
use crate::shared::{ActionRecord, StoreError};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_slots (
    name TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)";

/// Action store backed by a SQLite database
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    slot: String,
}

impl SqliteStore {
    /// Open or create the database at `path`
    ///
    /// Uses WAL mode so readers never block the single writer.
    pub async fn open(path: impl Into<PathBuf>, slot: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = Path::new(&path).parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        Self::with_pool(pool, slot).await
    }

    /// Open a private in-memory database
    pub async fn in_memory(slot: impl Into<String>) -> Result<Self, StoreError> {
        // every connection to :memory: is a separate database
        let options: SqliteConnectOptions = "sqlite::memory:".parse()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool, slot).await
    }

    async fn with_pool(pool: SqlitePool, slot: impl Into<String>) -> Result<Self, StoreError> {
        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self {
            pool,
            slot: slot.into(),
        })
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Close the connection pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl ActionStore for SqliteStore {
    async fn read_all(&self) -> Result<Vec<ActionRecord>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_slots WHERE name = ?")
            .bind(&self.slot)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("value")?;
                Ok(decode_slot(&raw))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, records: &[ActionRecord]) -> Result<(), StoreError> {
        let raw = encode_slot(records)?;
        sqlx::query(
            "INSERT INTO kv_slots (name, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(&self.slot)
        .bind(&raw)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
