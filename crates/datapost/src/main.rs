//! Datapost - periodic telemetry upload to a web API
//!
//! # Usage
//!
//! ```bash
//! # Run the exporter (default)
//! datapost
//! datapost --config configs/datapost.toml
//!
//! # Render one tick without sending it
//! datapost render --snapshot self.json
//!
//! # List unit identifiers for conversions
//! datapost units --measure speed
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use datapost_config::{LogConfig, LogFormat, LogLevel};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Datapost - periodic telemetry upload to a web API
#[derive(Parser, Debug)]
#[command(name = "datapost")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (.toml, or plugin settings .json)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the exporter until interrupted
    Run,

    /// Sample and render one tick, print it, send nothing
    Render(cmd::render::RenderArgs),

    /// List unit identifiers usable in path conversions
    Units(cmd::units::UnitsArgs),

    /// Print the JSON Schema of the [upload] section
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // No subcommand = run exporter (default behavior)
        Some(Command::Run) | None => {
            let config = cmd::load_config(cli.config.as_deref())?;
            init_logging(&config.log, cli.log_level)?;
            cmd::run::run(config).await
        }
        Some(Command::Render(args)) => {
            let config = cmd::load_config(cli.config.as_deref())?;
            // Quiet by default so the rendered output stands out
            init_logging(&config.log, Some(cli.log_level.unwrap_or(LogLevel::Warn)))?;
            cmd::render::run(config, args).await
        }
        Some(Command::Units(args)) => {
            // Units doesn't need logging - just outputs to stdout
            cmd::units::run(args)
        }
        Some(Command::Schema) => {
            // Schema doesn't need logging - just outputs to stdout
            cmd::schema::run()
        }
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(log: &LogConfig, level: Option<LogLevel>) -> Result<()> {
    let filter = EnvFilter::try_new(log.filter(level))
        .or_else(|_| EnvFilter::try_new(LogLevel::Info.as_str()))
        .map_err(|e| anyhow::anyhow!("invalid log filter: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).init(),
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
    }

    Ok(())
}
