/**
 * Replay Transport
 *
 * Sends a queued action record to its endpoint. The default transport is an
 * HTTP client: the record's `data` is serialized as the JSON request body and
 * sent with the record's method and `Content-Type: application/json`.
 *
 * The response body is never read. Whether a completed request counts as
 * delivered is decided by the `StatusPolicy`, not by the transport.
 */
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Url};
use serde::Deserialize;

use crate::offline::outcome::ReplayOutcome;
use crate::shared::config::{AppConfig, ConfigError};
use crate::shared::{ActionRecord, TransportError};

/// What a completed replay request answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayResponse {
    /// HTTP status code of the response
    pub status: u16,
}

impl ReplayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends action records to their endpoints
#[async_trait]
pub trait ReplayTransport: Send + Sync + 'static {
    /// Issue the request described by `record`
    ///
    /// `Err` means the request did not complete; the record stays queued.
    async fn replay(&self, record: &ActionRecord) -> Result<ReplayResponse, TransportError>;
}

/// How completed replay requests are classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusPolicy {
    /// Any completed request is delivered, whatever its status code
    #[default]
    TransportOnly,
    /// Only 2xx responses are delivered; other statuses stay queued
    RequireSuccess,
}

impl StatusPolicy {
    /// Turn a transport result into the outcome recorded for the record
    pub fn classify(&self, result: Result<ReplayResponse, TransportError>) -> ReplayOutcome {
        match (self, result) {
            (StatusPolicy::RequireSuccess, Ok(response)) if !response.is_success() => {
                ReplayOutcome::Failed {
                    reason: TransportError::Rejected(response.status).to_string(),
                }
            }
            (_, Ok(response)) => ReplayOutcome::Delivered {
                status: response.status,
            },
            (_, Err(e)) => ReplayOutcome::Failed {
                reason: e.to_string(),
            },
        }
    }
}

impl std::str::FromStr for StatusPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "transport-only" => Ok(Self::TransportOnly),
            "require-success" => Ok(Self::RequireSuccess),
            other => Err(ConfigError::invalid(
                "status_policy",
                format!("unknown status policy '{}'", other),
            )),
        }
    }
}

/// HTTP replay transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Create a transport resolving relative urls against `base`
    pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self { client, base })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let base = config.api_base()?;
        Self::new(base, config.request_timeout())
            .map_err(|e| ConfigError::invalid("api_url", e.to_string()))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve a record url
    ///
    /// Absolute URLs are used as-is. Anything else is joined onto the base,
    /// so `/api/vote` replaces the base path while `vote` extends it.
    pub fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        Url::parse(url)
            .or_else(|_| self.base.join(url))
            .map_err(|e| TransportError::InvalidUrl {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl ReplayTransport for HttpTransport {
    async fn replay(&self, record: &ActionRecord) -> Result<ReplayResponse, TransportError> {
        let method_name = record.effective_method();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method_name.clone()))?;
        let url = self.resolve(&record.url)?;
        let body = serde_json::to_vec(&record.data)
            .map_err(|e| TransportError::Request(format!("failed to encode payload: {}", e)))?;

        tracing::debug!(key = %record.key, method = %method, url = %url, "Replaying action");

        let response = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        Ok(ReplayResponse {
            status: response.status().as_u16(),
        })
    }
}
