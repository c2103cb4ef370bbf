use crate::model::NormalizedRecord;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Raw reply from the onboarding endpoint. The body is kept as text; the
/// controller decides how much of it to trust.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request never produced a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("could not build HTTP client: {0}")]
    Build(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_builder() {
            TransportError::Build(e.to_string())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Sends one onboarding record. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn post_json(&self, url: &str, record: &NormalizedRecord) -> Result<HttpReply, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportError> {
        // reqwest's blocking client defaults to 30s; None lifts the limit.
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("onboard-tui/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn post_json(&self, url: &str, record: &NormalizedRecord) -> Result<HttpReply, TransportError> {
        // .json() sets Content-Type: application/json
        let resp = self.client.post(url).json(record).send()?;
        let status = resp.status();
        let reason = status.canonical_reason().map(str::to_string);
        let body = resp.text().unwrap_or_default();
        Ok(HttpReply {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

/// Completion of one submission, delivered back to the UI loop.
pub struct SubmitMsg {
    pub result: Result<HttpReply, TransportError>,
}

pub fn spawn_submission(
    transport: Arc<dyn Transport>,
    endpoint: String,
    record: NormalizedRecord,
    tx: Sender<SubmitMsg>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        info!(%endpoint, services = record.services.len(), "posting onboarding record");
        let result = transport.post_json(&endpoint, &record);
        match &result {
            Ok(reply) => info!(status = reply.status, "onboarding endpoint replied"),
            Err(e) => warn!(error = %e, "onboarding request failed"),
        }
        let _ = tx.send(SubmitMsg { result });
    })
}
