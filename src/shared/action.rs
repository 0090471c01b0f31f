/**
 * Action Record Data Structure
 *
 * This module defines the ActionRecord struct: one pending write that a UI
 * collaborator wants to survive being offline. Records are stored as a JSON
 * array in the persistent action store and replayed against `url` once
 * connectivity returns.
 *
 * The serialized form is the persisted slot layout:
 * `{ "key": string, "data": any, "url": string, "method"?: string }`
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::shared::error::SyncError;

/// HTTP method used when a record does not name one
pub const DEFAULT_METHOD: &str = "POST";

/// A single pending mutation queued for replay
///
/// # Fields
/// * `key` - Logical action category, e.g. `"vote"` or `"issue"`
/// * `data` - Opaque JSON payload sent as the request body
/// * `url` - Absolute URL, or a path resolved against the API base URL
/// * `method` - Optional HTTP verb, `POST` when absent
///
/// # Example
/// ```rust
/// use villagesync::shared::ActionRecord;
/// use serde_json::json;
///
/// let record = ActionRecord::new(
///     "vote",
///     json!({ "projectId": "P101", "timestamp": 1000 }),
///     "/api/vote",
/// );
///
/// assert_eq!(record.effective_method(), "POST");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRecord {
    /// Logical action category
    pub key: String,
    /// Payload to replay
    #[serde(default)]
    pub data: Value,
    /// Target endpoint
    pub url: String,
    /// HTTP verb to use on replay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

impl ActionRecord {
    /// Create a record that replays with the default method
    pub fn new(key: impl Into<String>, data: Value, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            data,
            url: url.into(),
            method: None,
        }
    }

    /// Set the HTTP method used on replay
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// The method the replay request is sent with, upper-cased
    pub fn effective_method(&self) -> String {
        self.method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| DEFAULT_METHOD.to_string())
    }

    /// Check that the record can be queued
    ///
    /// `key` and `url` must be non-empty and `method`, when present, must be a
    /// valid HTTP method token.
    pub fn validate(&self) -> Result<(), SyncError> {
        if self.key.trim().is_empty() {
            return Err(SyncError::validation("key", "key cannot be empty"));
        }
        if self.url.trim().is_empty() {
            return Err(SyncError::validation("url", "url cannot be empty"));
        }
        if let Some(method) = &self.method {
            let token = method.trim();
            if token.is_empty() || reqwest::Method::from_bytes(token.as_bytes()).is_err() {
                return Err(SyncError::validation(
                    "method",
                    format!("'{}' is not a valid HTTP method", method),
                ));
            }
        }
        Ok(())
    }
}
