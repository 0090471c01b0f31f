//! Shared Module
//!
//! Types used by every other module: the action record, the error types and
//! the application configuration.

/// Action record data structure
pub mod action;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use action::{ActionRecord, DEFAULT_METHOD};
pub use error::{StoreError, SyncError, TransportError};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, StoreKind};
