//! Pipeline error types.

use datapost_config::ConfigError;
use datapost_units::UnitError;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors that can occur while building or running the pipeline.
///
/// None of these stop the trigger: tick-time errors are logged and the tick
/// is dropped.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Upload configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Template did not compile
    #[error("template error: {0}")]
    Template(String),

    /// Template failed to render an envelope
    #[error("render error: {0}")]
    Render(String),

    /// Conversion requested for a value that is not a number
    #[error("cannot convert non-numeric value from '{from}' to '{to}'")]
    NotNumeric { from: String, to: String },

    /// Conversion units are unknown or measure different things
    #[error(transparent)]
    Units(#[from] UnitError),

    /// Conversion produced NaN or infinity
    #[error("conversion from '{from}' to '{to}' produced a non-finite number")]
    NonFinite { from: String, to: String },

    /// Custom header name or value is not valid HTTP
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Network error while talking to the upload endpoint or the feed
    #[error("network error: {0}")]
    Network(String),

    /// Snapshot document is not valid JSON
    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// IO error (e.g., reading a snapshot file)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TelemetryError {
    /// Create an invalid header error
    pub fn header(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Header {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
