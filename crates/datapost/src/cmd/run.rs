//! Run command - sample and upload until interrupted
//!
//! Starts the snapshot feed (when `[source]` has a location), subscribes the
//! exporter to the trigger path, and on SIGINT/SIGTERM stops the exporter
//! and the feed.

use std::sync::Arc;

use anyhow::{Context, Result};
use datapost_config::Config;
use datapost_telemetry::{DeliveryOutcome, Exporter, HttpTransport, SnapshotFeed, ValueTree};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Delivery outcome counts for the shutdown summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeTally {
    pub delivered: u64,
    pub rejected: u64,
    pub failed: u64,
}

impl OutcomeTally {
    fn record(&mut self, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered { .. } => self.delivered += 1,
            DeliveryOutcome::Rejected { .. } => self.rejected += 1,
            DeliveryOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Run the exporter
pub async fn run(config: Config) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        url = %config.upload.url,
        paths = config.upload.paths.len(),
        "datapost starting"
    );

    let tree = Arc::new(ValueTree::new());
    let transport =
        Arc::new(HttpTransport::new(config.upload.timeout).context("failed to build HTTP client")?);
    let mut exporter = Exporter::new(&config.upload, tree.clone(), transport)
        .context("failed to build upload pipeline")?;

    let cancel = CancellationToken::new();
    let tally_task = exporter
        .outcomes()
        .map(|outcomes| spawn_tally(outcomes, cancel.clone()));

    let feed_task = if config.source.is_configured() {
        let feed = SnapshotFeed::new(config.source.clone(), tree.clone())
            .context("failed to build snapshot feed")?;
        Some(feed.spawn(cancel.clone()))
    } else {
        warn!("no [source] location configured, waiting for values that never arrive");
        None
    };

    exporter.start(tree.stream(config.source.trigger_path.as_str()));

    wait_for_shutdown().await;

    info!("shutdown signal received, stopping exporter...");

    exporter.stop();
    cancel.cancel();

    if let Some(task) = feed_task
        && let Err(e) = task.await
    {
        warn!(error = %e, "snapshot feed panicked during shutdown");
    }

    if let Some(task) = tally_task {
        match task.await {
            Ok(tally) => info!(
                delivered = tally.delivered,
                rejected = tally.rejected,
                failed = tally.failed,
                "datapost stopped"
            ),
            Err(e) => warn!(error = %e, "outcome reporter panicked"),
        }
    }

    Ok(())
}

/// Count outcomes until cancelled
fn spawn_tally(
    mut outcomes: mpsc::Receiver<DeliveryOutcome>,
    cancel: CancellationToken,
) -> JoinHandle<OutcomeTally> {
    tokio::spawn(async move {
        let mut tally = OutcomeTally::default();
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                outcome = outcomes.recv() => match outcome {
                    Some(outcome) => tally.record(&outcome),
                    None => break,
                },
            }
        }
        tally
    })
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
