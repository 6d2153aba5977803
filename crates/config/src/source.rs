//! Data source configuration
//!
//! Where the live value tree comes from when datapost runs standalone.

use std::time::Duration;

use serde::Deserialize;

/// Default refresh period for the snapshot feed
const DEFAULT_REFRESH: Duration = Duration::from_secs(1);

/// Path whose updates drive uploads
const DEFAULT_TRIGGER_PATH: &str = "navigation.datetime";

/// Kind of snapshot feed
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON document on disk, re-read every refresh
    #[default]
    File,
    /// JSON document fetched with HTTP GET (e.g. a Signal K REST endpoint)
    Http,
}

/// Data source configuration
///
/// # Example
///
/// ```toml
/// [source]
/// kind = "http"
/// location = "http://localhost:3000/signalk/v1/api/vessels/self"
/// refresh = "1s"
/// trigger_path = "navigation.datetime"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Feed kind (file, http)
    /// Default: file
    pub kind: SourceKind,

    /// File path or URL of the JSON document
    pub location: String,

    /// How often the document is reloaded
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub refresh: Duration,

    /// Path whose updates are the change events that trigger uploads
    /// Default: navigation.datetime
    pub trigger_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::File,
            location: String::new(),
            refresh: DEFAULT_REFRESH,
            trigger_path: DEFAULT_TRIGGER_PATH.to_string(),
        }
    }
}

impl SourceConfig {
    /// Whether a feed location was configured
    pub fn is_configured(&self) -> bool {
        !self.location.trim().is_empty()
    }
}
