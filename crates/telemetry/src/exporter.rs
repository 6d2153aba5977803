//! Exporter - wires the trigger to the pipeline and owns its lifecycle.
//!
//! A `Pipeline` holds everything a tick needs and nothing that changes
//! between ticks: path and header configuration, the compiled template, the
//! data source and the delivery client. An `Exporter` subscribes a pipeline
//! to one or more change streams and tears those subscriptions down on stop.

use std::sync::Arc;

use datapost_config::{PathSpec, UploadConfig, validate_upload};
use parking_lot::Mutex;
use reqwest::header::HeaderMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::delivery::{
    DeliveryClient, DeliveryHandle, DeliveryOutcome, Transport, UploadRequest, merge_headers,
};
use crate::envelope::{Envelope, PathFailure};
use crate::error::Result;
use crate::render::Renderer;
use crate::source::DataSource;
use crate::trigger::{ChangeStream, Subscription, Trigger, subscribe};

/// Synchronous result of one tick, before anything is sent
#[derive(Debug)]
pub struct PreparedTick {
    /// Items handed to the template
    pub envelope: Envelope,
    /// Paths dropped because their conversion failed
    pub failures: Vec<PathFailure>,
    /// Rendered template output
    pub body: String,
    /// Upload to send; `None` when the envelope is empty
    pub request: Option<UploadRequest>,
}

/// Immutable per-instance pipeline state.
pub struct Pipeline {
    url: String,
    paths: Vec<PathSpec>,
    headers: HeaderMap,
    renderer: Renderer,
    source: Arc<dyn DataSource>,
    delivery: DeliveryClient,
}

impl Pipeline {
    /// Validate the upload section, compile the template and merge headers.
    pub fn new(
        config: &UploadConfig,
        source: Arc<dyn DataSource>,
        delivery: DeliveryClient,
    ) -> Result<Self> {
        validate_upload(config)?;

        Ok(Self {
            url: config.url.trim().to_string(),
            paths: config.paths.clone(),
            headers: merge_headers(&config.headers)?,
            renderer: Renderer::compile(&config.template, config.escape_html)?,
            source,
            delivery,
        })
    }

    /// Sample, render and build the request without sending it.
    ///
    /// Only a render error fails; path-level problems are in `failures`.
    pub fn prepare(&self) -> Result<PreparedTick> {
        let built = Envelope::build(&self.paths, self.source.as_ref());
        let body = self.renderer.render(&built.envelope)?;

        let request = (!built.envelope.is_empty()).then(|| UploadRequest {
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: body.clone(),
        });

        Ok(PreparedTick {
            envelope: built.envelope,
            failures: built.failures,
            body,
            request,
        })
    }

    /// Run one tick: prepare, then dispatch the upload in the background.
    ///
    /// Returns the delivery handle, or `None` when nothing was sent. Never
    /// panics and never blocks on the network.
    pub fn tick(&self) -> Option<DeliveryHandle> {
        let prepared = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(error = %e, "template render failed, tick skipped");
                return None;
            }
        };

        debug!(output = %prepared.body, "template output");

        let Some(request) = prepared.request else {
            debug!("envelope empty, nothing to upload");
            return None;
        };

        debug!(headers = ?request.headers, "upload headers");
        debug!(url = %request.url, items = prepared.envelope.len(), "posting upload");

        Some(self.delivery.dispatch(request))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("url", &self.url)
            .field("paths", &self.paths.len())
            .field("delivery", &self.delivery)
            .finish_non_exhaustive()
    }
}

/// Runs a pipeline on a trigger until stopped.
///
/// `stop` releases every subscription and is safe to call any number of
/// times, including before `start`.
#[derive(Debug)]
pub struct Exporter {
    pipeline: Arc<Pipeline>,
    trigger: Trigger,
    subscriptions: Mutex<Vec<Subscription>>,
    outcomes: Option<mpsc::Receiver<DeliveryOutcome>>,
}

impl Exporter {
    /// Build the pipeline for `config`.
    ///
    /// Fails on invalid configuration or a template that does not compile.
    pub fn new(
        config: &UploadConfig,
        source: Arc<dyn DataSource>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let mut delivery = DeliveryClient::new(transport);
        let outcomes = delivery.observe();

        Ok(Self {
            pipeline: Arc::new(Pipeline::new(config, source, delivery)?),
            trigger: Trigger::from_config(config),
            subscriptions: Mutex::new(Vec::new()),
            outcomes: Some(outcomes),
        })
    }

    /// The trigger this exporter subscribes with
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// The underlying pipeline
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    /// Take the delivery outcome receiver. Only the first call gets it.
    pub fn outcomes(&mut self) -> Option<mpsc::Receiver<DeliveryOutcome>> {
        self.outcomes.take()
    }

    /// Subscribe the pipeline to `stream`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S: ChangeStream>(&self, stream: S) {
        let pipeline = Arc::clone(&self.pipeline);
        let subscription = subscribe(self.trigger, stream, move |value| {
            debug!(value = %value, "tick");
            // Detached; the outcome reaches the observer channel
            let _ = pipeline.tick();
        });

        self.subscriptions.lock().push(subscription);
        info!(trigger = ?self.trigger, "exporter started");
    }

    /// Whether any subscription is active
    pub fn is_running(&self) -> bool {
        !self.subscriptions.lock().is_empty()
    }

    /// Release every subscription. Returns how many were released.
    ///
    /// In-flight uploads are left to finish on their own.
    pub fn stop(&self) -> usize {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        let released = subscriptions.iter().filter(|sub| sub.close()).count();
        if released > 0 {
            info!(released, "exporter stopped");
        }
        released
    }
}

impl Drop for Exporter {
    fn drop(&mut self) {
        self.stop();
    }
}
