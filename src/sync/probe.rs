//! # Connectivity Probe
//!
//! Polls the API with a `GET` request and reports the result to a
//! [`NetworkMonitor`]: any completed response means online, a transport error
//! means offline. Used where no platform connectivity event is available.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use tokio::task::JoinHandle;

use crate::shared::config::{AppConfig, ConfigError};
use crate::shared::TransportError;
use crate::sync::network_monitor::{NetworkMonitor, NetworkStatus};

/// Periodic reachability check against the API
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    client: Client,
    url: Url,
    interval: Duration,
}

impl ConnectivityProbe {
    /// Create a probe for `url`; each check times out after at most 10s
    pub fn new(url: Url, interval: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(interval.min(Duration::from_secs(10)))
            .build()?;
        Ok(Self {
            client,
            url,
            interval,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let url = config
            .api_base()?
            .join(&config.probe.path)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.probe.path, e)))?;
        Self::new(url, config.probe_interval())
            .map_err(|e| ConfigError::invalid("probe", e.to_string()))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Probe once
    pub async fn check(&self) -> NetworkStatus {
        match self.client.get(self.url.clone()).send().await {
            Ok(_) => NetworkStatus::Online,
            Err(e) => {
                tracing::debug!(url = %self.url, error = %e, "Connectivity probe failed");
                NetworkStatus::Offline
            }
        }
    }

    /// Probe on every interval tick until the returned handle is dropped
    pub fn spawn(self, monitor: Arc<NetworkMonitor>) -> ProbeHandle {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let status = self.check().await;
                monitor.set_status(status);
            }
        });
        ProbeHandle { handle }
    }
}

/// Stops the probe task on drop
#[derive(Debug)]
pub struct ProbeHandle {
    handle: JoinHandle<()>,
}

impl Drop for ProbeHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
