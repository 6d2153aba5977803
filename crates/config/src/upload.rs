//! Upload configuration
//!
//! What to sample, how to render it and where to POST it. Field names accept
//! the camelCase spelling used by the original plugin settings
//! (`handlebarsTemplate`, `httpHeaders`, `headerName`, `conversionFrom`, ...).

use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default HTTP request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How change events inside an active debounce window are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DebounceMode {
    /// Window runs from the last upload; events inside it are dropped
    #[default]
    Fixed,
    /// Every dropped event restarts the window
    Rolling,
}

/// One value to sample: source path, output name and optional conversion
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct PathSpec {
    /// Dotted path to a value in the data source. Must resolve to a number,
    /// string or boolean, not an object.
    pub path: String,

    /// Output name for the value; data is structured as name/value pairs
    pub name: String,

    /// Unit the value is converted from
    #[serde(alias = "conversionFrom")]
    pub conversion_from: Option<String>,

    /// Unit the value is converted to
    #[serde(alias = "conversionTo")]
    pub conversion_to: Option<String>,
}

impl PathSpec {
    /// Create a path entry without conversion
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            conversion_from: None,
            conversion_to: None,
        }
    }

    /// Set both conversion units
    pub fn with_conversion(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.conversion_from = Some(from.into());
        self.conversion_to = Some(to.into());
        self
    }

    /// Conversion pair, only when both units are present and non-empty
    pub fn conversion(&self) -> Option<(&str, &str)> {
        let from = self.conversion_from.as_deref().filter(|u| !u.is_empty())?;
        let to = self.conversion_to.as_deref().filter(|u| !u.is_empty())?;
        Some((from, to))
    }
}

/// One custom HTTP header sent with every upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct HeaderSpec {
    /// Header name
    #[serde(alias = "headerName")]
    pub name: String,

    /// Header value
    #[serde(alias = "headerValue")]
    pub value: String,
}

impl HeaderSpec {
    /// Create a header entry
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Upload configuration
///
/// # Example
///
/// ```toml
/// [upload]
/// url = "https://example.com/api/telemetry"
/// interval = 60
/// template = '{"sog":"{{getValueByName path "sog"}}"}'
///
/// [[upload.headers]]
/// name = "x-api-key"
/// value = "secret"
///
/// [[upload.paths]]
/// path = "navigation.speedOverGround"
/// name = "sog"
/// conversion_from = "m/s"
/// conversion_to = "knot"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct UploadConfig {
    /// WebAPI POST URL
    pub url: String,

    /// Update frequency in seconds. Absent or <= 0 uploads once, on the
    /// first change event.
    /// Suggested: 60
    #[schemars(extend("default" = 60))]
    pub interval: Option<f64>,

    /// Debounce window behaviour
    /// Default: fixed
    pub debounce: DebounceMode,

    /// Handlebars template used to format the output data
    #[serde(alias = "handlebarsTemplate")]
    pub template: String,

    /// HTML-escape values rendered with `{{ }}`
    /// Default: true
    pub escape_html: bool,

    /// HTTP request timeout
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub timeout: Duration,

    /// Custom HTTP headers, applied after `accept` and `content-type`
    #[serde(alias = "httpHeaders")]
    pub headers: Vec<HeaderSpec>,

    /// Paths to include in the output data, in output order
    pub paths: Vec<PathSpec>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            interval: None,
            debounce: DebounceMode::Fixed,
            template: String::new(),
            escape_html: true,
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            paths: Vec::new(),
        }
    }
}

impl UploadConfig {
    /// Debounce window, or `None` for a one-shot upload
    pub fn interval(&self) -> Option<Duration> {
        self.interval
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}
