//! Snapshot feed - keeps a `ValueTree` current when running standalone.
//!
//! Every `refresh` period the configured JSON document is reloaded, from
//! disk or with an HTTP GET (e.g. a Signal K `vessels/self` REST endpoint),
//! and swapped into the tree. The swap is announced as a root change, which
//! every path stream (the trigger path included) sees as an update.

use std::sync::Arc;

use datapost_config::{SourceConfig, SourceKind};
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, TelemetryError};
use crate::source::ValueTree;

/// Periodically reloads a JSON document into a value tree.
#[derive(Debug)]
pub struct SnapshotFeed {
    config: SourceConfig,
    tree: Arc<ValueTree>,
    client: reqwest::Client,
}

impl SnapshotFeed {
    /// Create a feed writing into `tree`.
    ///
    /// HTTP requests time out after one refresh period.
    pub fn new(config: SourceConfig, tree: Arc<ValueTree>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.refresh)
            .build()
            .map_err(|e| TelemetryError::Network(e.to_string()))?;

        Ok(Self {
            config,
            tree,
            client,
        })
    }

    /// Fetch and parse the document once.
    pub async fn load(&self) -> Result<Value> {
        let text = match self.config.kind {
            SourceKind::File => tokio::fs::read_to_string(&self.config.location).await?,
            SourceKind::Http => self
                .client
                .get(&self.config.location)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| TelemetryError::Network(e.to_string()))?
                .text()
                .await
                .map_err(|e| TelemetryError::Network(e.to_string()))?,
        };

        Ok(serde_json::from_str(&text)?)
    }

    /// Load the document and swap it into the tree.
    pub async fn refresh(&self) -> Result<()> {
        let document = self.load().await?;
        self.tree.replace(document);
        Ok(())
    }

    /// Refresh every period until `cancel` fires.
    ///
    /// Failed refreshes are logged and the previous document is kept.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            kind = ?self.config.kind,
            location = %self.config.location,
            refresh = ?self.config.refresh,
            "snapshot feed started"
        );

        let mut interval = tokio::time::interval(self.config.refresh);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("snapshot feed shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.refresh().await {
                        warn!(location = %self.config.location, error = %e, "snapshot refresh failed");
                    }
                }
            }
        }
    }

    /// Spawn `run` as a background task
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
