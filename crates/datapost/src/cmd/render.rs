//! Render command - dry-run one tick
//!
//! Samples the configured paths, renders the template and shows exactly what
//! would be POSTed, without sending anything.
//!
//! # Usage
//!
//! ```bash
//! # Use a saved value tree
//! datapost render --snapshot self.json
//!
//! # Load [source] once
//! datapost render --config configs/datapost.toml
//!
//! # JSON output
//! datapost render --snapshot self.json --json
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use datapost_config::Config;
use datapost_telemetry::{
    DeliveryClient, HttpTransport, Pipeline, PreparedTick, SnapshotFeed, ValueTree,
};
use serde_json::{Map, Value, json};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// JSON document to sample from (defaults to loading [source] once)
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the render command
pub async fn run(config: Config, args: RenderArgs) -> Result<()> {
    let tree = Arc::new(ValueTree::new());

    match &args.snapshot {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read snapshot {}", path.display()))?;
            let document: Value =
                serde_json::from_str(&text).context("snapshot is not valid JSON")?;
            tree.replace(document);
        }
        None if config.source.is_configured() => {
            SnapshotFeed::new(config.source.clone(), tree.clone())?
                .refresh()
                .await
                .context("failed to load snapshot from [source]")?;
        }
        None => {}
    }

    let transport = Arc::new(HttpTransport::new(config.upload.timeout)?);
    let pipeline = Pipeline::new(&config.upload, tree, DeliveryClient::new(transport))
        .context("failed to build upload pipeline")?;
    let prepared = pipeline.prepare().context("failed to render template")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&prepared))?);
    } else {
        print_prepared(&prepared);
    }

    Ok(())
}

fn to_json(prepared: &PreparedTick) -> Value {
    let failures: Vec<Value> = prepared
        .failures
        .iter()
        .map(|f| json!({ "path": f.path, "name": f.name, "error": f.error.to_string() }))
        .collect();

    let request = prepared.request.as_ref().map(|request| {
        let headers: Map<String, Value> = request
            .headers
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().unwrap_or("<binary>");
                (name.to_string(), Value::String(value.to_string()))
            })
            .collect();
        json!({ "method": "POST", "url": request.url, "headers": headers })
    });

    json!({
        "envelope": prepared.envelope,
        "failures": failures,
        "body": prepared.body,
        "request": request,
    })
}

fn print_prepared(prepared: &PreparedTick) {
    println!("Envelope ({} items)", prepared.envelope.len());
    for item in &prepared.envelope.path {
        let value = serde_json::to_string(&item.value).unwrap_or_default();
        println!("  {:<20} {}", item.name, value);
    }

    if !prepared.failures.is_empty() {
        println!();
        println!("Dropped");
        for failure in &prepared.failures {
            println!("  {:<20} {} ({})", failure.name, failure.error, failure.path);
        }
    }

    println!();
    match &prepared.request {
        Some(request) => {
            println!("POST {}", request.url);
            for (name, value) in &request.headers {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
        }
        None => println!("Envelope empty, nothing would be sent"),
    }

    println!();
    println!("{}", prepared.body);
}
