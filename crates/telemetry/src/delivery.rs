//! Delivery client - POSTs rendered payloads to the upload endpoint.
//!
//! Each dispatch runs in its own task and never blocks the trigger. The
//! outcome is logged, returned through the task handle, and pushed with
//! `try_send` to an optional observer channel so callers never wait on a
//! slow reader.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use datapost_config::HeaderSpec;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{Result, TelemetryError};

/// Observer channel buffer - outcomes beyond this are dropped
pub const OUTCOME_BUFFER: usize = 64;

/// Build the request headers.
///
/// `accept: */*` and `content-type: application/json` go in first; custom
/// headers follow in order and replace any header with the same
/// (case-insensitive) name.
pub fn merge_headers(custom: &[HeaderSpec]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for header in custom {
        let name = HeaderName::from_bytes(header.name.trim().as_bytes())
            .map_err(|e| TelemetryError::header(&header.name, e))?;
        let value = HeaderValue::from_str(&header.value)
            .map_err(|e| TelemetryError::header(&header.name, e))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// One upload. Always sent as POST.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl UploadRequest {
    /// HTTP method used for every upload
    pub const METHOD: &'static str = "POST";
}

/// What the endpoint answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

/// HTTP transport seam.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one request. Errors are transport-level failures only; any
    /// received status is a response.
    async fn post(&self, request: &UploadRequest) -> Result<TransportResponse>;
}

/// reqwest-backed transport with a request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TelemetryError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: &UploadRequest) -> Result<TransportResponse> {
        let response = self
            .client
            .post(&request.url)
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| TelemetryError::Network(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

/// Result of one delivery attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Endpoint answered 2xx
    Delivered { status: u16 },
    /// Endpoint answered with any other status
    Rejected { status: u16, body: String },
    /// No response (connect error, timeout, ...)
    Failed { error: String },
}

impl DeliveryOutcome {
    /// Classify a response: 2xx is delivered, everything else rejected
    pub fn from_response(response: TransportResponse) -> Self {
        if (200..300).contains(&response.status) {
            Self::Delivered {
                status: response.status,
            }
        } else {
            Self::Rejected {
                status: response.status,
                body: response.body,
            }
        }
    }

    /// Whether the upload was accepted
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Send one request and classify the result. Never fails.
pub async fn deliver(transport: &dyn Transport, request: &UploadRequest) -> DeliveryOutcome {
    match transport.post(request).await {
        Ok(response) => {
            debug!(
                url = %request.url,
                status = response.status,
                reason = response.reason.as_deref().unwrap_or(""),
                "upload response"
            );
            DeliveryOutcome::from_response(response)
        }
        Err(e) => DeliveryOutcome::Failed {
            error: e.to_string(),
        },
    }
}

fn report(url: &str, outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Delivered { status } => {
            debug!(url = %url, status, "upload delivered");
        }
        DeliveryOutcome::Rejected { status, body } => {
            warn!(url = %url, status, body = %body, "upload rejected by server");
        }
        DeliveryOutcome::Failed { error } => {
            warn!(url = %url, error = %error, "upload failed");
        }
    }
}

/// Handle to one in-flight delivery.
///
/// Dropping it detaches the task; the upload still runs to completion.
#[derive(Debug)]
pub struct DeliveryHandle {
    task: JoinHandle<DeliveryOutcome>,
}

impl DeliveryHandle {
    /// Wait for the outcome
    pub async fn outcome(self) -> DeliveryOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => DeliveryOutcome::Failed {
                error: format!("delivery task failed: {e}"),
            },
        }
    }

    /// Whether the delivery already finished
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Dispatches uploads as background tasks.
///
/// Cheap to clone; clones share the transport and the observer channel.
#[derive(Clone)]
pub struct DeliveryClient {
    transport: Arc<dyn Transport>,
    observer: Option<mpsc::Sender<DeliveryOutcome>>,
}

impl DeliveryClient {
    /// Create a client without an observer
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            observer: None,
        }
    }

    /// Attach an observer channel and return its receiver
    pub fn observe(&mut self) -> mpsc::Receiver<DeliveryOutcome> {
        let (tx, rx) = mpsc::channel(OUTCOME_BUFFER);
        self.observer = Some(tx);
        rx
    }

    /// Start one upload in the background (fire-and-forget).
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, request: UploadRequest) -> DeliveryHandle {
        let transport = Arc::clone(&self.transport);
        let observer = self.observer.clone();

        let task = tokio::spawn(async move {
            let outcome = deliver(transport.as_ref(), &request).await;
            report(&request.url, &outcome);

            if let Some(tx) = observer
                && tx.try_send(outcome.clone()).is_err()
            {
                trace!("outcome channel full or closed, outcome dropped");
            }

            outcome
        });

        DeliveryHandle { task }
    }
}

impl std::fmt::Debug for DeliveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryClient")
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}
