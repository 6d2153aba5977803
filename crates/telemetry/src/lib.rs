//! Datapost telemetry - sample, convert, render and upload.
//!
//! This crate is the exporter pipeline. Key principles:
//!
//! - **Explicit dependencies**: the data source, change stream and HTTP
//!   transport are passed in, so every stage runs without a live host
//! - **Non-blocking**: uploads are fire-and-forget tasks, a slow endpoint
//!   never delays the next tick
//! - **Available over correct**: a bad path or a failed upload is logged and
//!   dropped; nothing on the tick path stops the trigger
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Trigger   │────▶│   Envelope   │────▶│   Renderer   │
//! │ (debounce / │     │ (sample +    │     │ (handlebars) │
//! │   once)     │     │  guard/conv) │     └──────┬───────┘
//! └─────────────┘     └──────────────┘            │
//!       ▲                    ▲                    ▼
//!       │ changes            │ get_value   ┌──────────────┐
//! ┌─────┴───────┐            │             │   Delivery   │
//! │  ValueTree  │────────────┘             │ (async task) │
//! │ (live data) │                          └──────┬───────┘
//! └─────────────┘                                 │ HTTP POST
//!       ▲                                         ▼
//! ┌─────┴───────┐                          ┌──────────────┐
//! │ SnapshotFeed│                          │   Endpoint   │
//! └─────────────┘                          └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use datapost_config::{PathSpec, UploadConfig};
//! use datapost_telemetry::{Exporter, HttpTransport, ValueTree};
//!
//! # async fn example() -> datapost_telemetry::Result<()> {
//! let config = UploadConfig {
//!     url: "https://example.com/api".into(),
//!     interval: Some(60.0),
//!     template: r#"{"sog":"{{getValueByName path "sog"}}"}"#.into(),
//!     paths: vec![
//!         PathSpec::new("navigation.speedOverGround", "sog").with_conversion("m/s", "knot"),
//!     ],
//!     ..Default::default()
//! };
//!
//! let tree = Arc::new(ValueTree::new());
//! let transport = Arc::new(HttpTransport::new(Duration::from_secs(10))?);
//! let exporter = Exporter::new(&config, tree.clone(), transport)?;
//!
//! exporter.start(tree.stream("navigation.datetime"));
//! tree.set("navigation.speedOverGround", 5.14.into());
//! tree.set("navigation.datetime", "2024-06-01T12:00:00Z".into());
//!
//! // ...
//! exporter.stop();
//! # Ok(())
//! # }
//! ```

pub mod delivery;
pub mod envelope;
pub mod error;
pub mod exporter;
pub mod feed;
pub mod render;
pub mod sample;
pub mod source;
pub mod trigger;

pub use delivery::{
    DeliveryClient, DeliveryHandle, DeliveryOutcome, HttpTransport, Transport, TransportResponse,
    UploadRequest, merge_headers,
};
pub use envelope::{Built, Envelope, EnvelopeItem, PathFailure};
pub use error::{Result, TelemetryError};
pub use exporter::{Exporter, Pipeline, PreparedTick};
pub use feed::SnapshotFeed;
pub use render::Renderer;
pub use sample::{ItemValue, guard, process};
pub use source::{ChangeEvent, DataSource, PathStream, ValueTree};
pub use trigger::{ChangeStream, Subscription, Trigger, subscribe};
