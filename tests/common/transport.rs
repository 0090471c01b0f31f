//! Scripted replay transports
//!
//! Stand-ins for the HTTP transport that decide per record whether a replay
//! completes, and remember every record they were asked to replay.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use villagesync::shared::{ActionRecord, TransportError};
use villagesync::sync::{ReplayResponse, ReplayTransport};

type FailWhen = Box<dyn Fn(&ActionRecord) -> bool + Send + Sync>;

/// Pauses replays until the test releases them
#[derive(Debug, Default)]
pub struct ReplayGate {
    started: Notify,
    release: Notify,
}

impl ReplayGate {
    /// Wait until a replay is parked on the gate
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let one parked replay continue
    pub fn release_one(&self) {
        self.release.notify_one();
    }
}

pub struct ScriptedTransport {
    fail_when: FailWhen,
    status: u16,
    calls: Mutex<Vec<ActionRecord>>,
    gate: Option<Arc<ReplayGate>>,
}

impl ScriptedTransport {
    pub fn succeeding() -> Self {
        Self::failing_when(|_| false)
    }

    pub fn failing_all() -> Self {
        Self::failing_when(|_| true)
    }

    /// Fail records whose url is in `urls`
    pub fn failing_urls(urls: &[&str]) -> Self {
        let urls: Vec<String> = urls.iter().map(|u| u.to_string()).collect();
        Self::failing_when(move |record| urls.contains(&record.url))
    }

    pub fn failing_when(fail_when: impl Fn(&ActionRecord) -> bool + Send + Sync + 'static) -> Self {
        Self {
            fail_when: Box::new(fail_when),
            status: 200,
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Answer completed replays with `status`
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_gate(mut self, gate: Arc<ReplayGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Records replayed so far, in call order
    pub fn calls(&self) -> Vec<ActionRecord> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReplayTransport for ScriptedTransport {
    async fn replay(&self, record: &ActionRecord) -> Result<ReplayResponse, TransportError> {
        self.calls.lock().unwrap().push(record.clone());

        if let Some(gate) = &self.gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        if (self.fail_when)(record) {
            Err(TransportError::Request(format!("connection refused: {}", record.url)))
        } else {
            Ok(ReplayResponse { status: self.status })
        }
    }
}
