//! Shared Error Types
//!
//! This module defines the error types used across the queue, the stores and
//! the replay transport.
//!
//! # Error Categories
//!
//! - `SyncError` - Errors returned to callers of the queue
//! - `StoreError` - Failures of the persistent action store
//! - `TransportError` - Failures to deliver a replay request
//!
//! Transport errors never reach queue callers: a failed replay keeps the
//! record pending and is reported through the drain outcome instead.
//!
//! # Usage
//!
//! ```rust
//! use villagesync::shared::error::SyncError;
//!
//! let error = SyncError::validation("url", "url cannot be empty");
//! ```
use thiserror::Error;

use crate::shared::config::ConfigError;

/// Errors surfaced by the offline sync queue
#[derive(Debug, Error)]
pub enum SyncError {
    /// The persistent action store failed to read or write the pending list
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An action record was rejected before being queued
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SyncError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// Errors raised by an [`ActionStore`](crate::offline::store::ActionStore) backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure while reading or replacing the slot file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The pending list could not be encoded for writing
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A backend-specific failure (used by custom and test stores)
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised while replaying a record against its endpoint
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be completed (no connectivity, DNS, refused connection...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The record's url could not be resolved into an absolute URL
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The url as stored on the record
        url: String,
        /// Parser message
        message: String,
    },

    /// The record's method is not a valid HTTP method
    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// The request did not complete before the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The endpoint answered with a status the status policy treats as retryable
    #[error("Endpoint rejected replay with status {0}")]
    Rejected(u16),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(err.to_string())
        }
    }
}
