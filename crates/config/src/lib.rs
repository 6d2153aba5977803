//! Datapost Configuration
//!
//! TOML-based configuration loading with sensible defaults. Signal K plugin
//! settings (a JSON document with a `configuration` object) load too.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use datapost_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str(r#"
//! [upload]
//! url = "https://example.com/api"
//! template = "{}"
//! "#).unwrap();
//! assert_eq!(config.upload.url, "https://example.com/api");
//! ```
//!
//! # Example Config
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [source]
//! kind = "http"
//! location = "http://localhost:3000/signalk/v1/api/vessels/self"
//!
//! [upload]
//! url = "https://example.com/api/telemetry"
//! interval = 60
//! template = '{"sog":"{{getValueByName path "sog"}}"}'
//!
//! [[upload.paths]]
//! path = "navigation.speedOverGround.value"
//! name = "sog"
//! conversion_from = "m/s"
//! conversion_to = "knot"
//! ```

mod error;
mod logging;
mod source;
mod upload;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use source::{SourceConfig, SourceKind};
pub use upload::{DebounceMode, HeaderSpec, PathSpec, UploadConfig};
pub use validation::validate_upload;

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Live data feed
    pub source: SourceConfig,

    /// What to sample and where to send it
    pub upload: UploadConfig,
}

impl Config {
    /// Load configuration from a file
    ///
    /// Files ending in `.json` are read as plugin settings, everything else
    /// as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, does not parse, or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_plugin_json(&contents)
        } else {
            Self::from_str(&contents)
        }
    }

    /// Parse plugin settings JSON
    ///
    /// Accepts either the full settings document (`{"enabled": true,
    /// "configuration": {...}}`) or the bare `configuration` object.
    pub fn from_plugin_json(s: &str) -> Result<Self> {
        let mut document: serde_json::Value = serde_json::from_str(s)?;
        let settings = match document.get_mut("configuration") {
            Some(inner) => inner.take(),
            None => document,
        };

        let config = Config {
            upload: serde_json::from_value(settings)?,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    const MINIMAL: &str = r#"
[upload]
url = "http://localhost:8080/ingest"
template = "{}"
"#;

    #[test]
    fn test_empty_config_fails_validation() {
        let err = Config::from_str("").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "url", .. }));
    }

    #[test]
    fn test_minimal_config() {
        let config = Config::from_str(MINIMAL).unwrap();
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.source.trigger_path, "navigation.datetime");
        assert!(config.upload.paths.is_empty());
        assert_eq!(config.upload.interval(), None);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[log]
level = "debug"
format = "json"

[source]
kind = "file"
location = "/var/lib/datapost/self.json"
refresh = "2s"

[upload]
url = "https://example.com/api"
interval = 60
debounce = "rolling"
template = '{"v":"{{getValueByName path "sog"}}"}'

[[upload.headers]]
name = "x-api-key"
value = "abc"

[[upload.paths]]
path = "navigation.speedOverGround"
name = "sog"
conversion_from = "m/s"
conversion_to = "knot"

[[upload.paths]]
path = "navigation.headingTrue"
name = "hdg"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.source.refresh, Duration::from_secs(2));
        assert_eq!(config.upload.interval(), Some(Duration::from_secs(60)));
        assert_eq!(config.upload.debounce, DebounceMode::Rolling);
        assert_eq!(config.upload.headers.len(), 1);
        assert_eq!(config.upload.paths.len(), 2);
        assert_eq!(config.upload.paths[1].name, "hdg");
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_plugin_json_document() {
        let json = r#"{
            "enabled": true,
            "configuration": {
                "url": "https://example.com/api",
                "interval": 60,
                "handlebarsTemplate": "{\"v\":\"{{getValueByName path \"sog\"}}\"}",
                "httpHeaders": [{"headerName": "x-api-key", "headerValue": "abc"}],
                "paths": [{
                    "path": "navigation.speedOverGround",
                    "name": "sog",
                    "conversionFrom": "m/s",
                    "conversionTo": "knot"
                }]
            }
        }"#;
        let config = Config::from_plugin_json(json).unwrap();
        assert_eq!(config.upload.url, "https://example.com/api");
        assert_eq!(config.upload.headers[0].value, "abc");
        assert_eq!(config.upload.paths[0].conversion(), Some(("m/s", "knot")));
        assert!(config.upload.template.contains("getValueByName"));
    }

    #[test]
    fn test_plugin_json_bare_configuration() {
        let json = r#"{"url": "http://localhost/api", "handlebarsTemplate": "{}"}"#;
        let config = Config::from_plugin_json(json).unwrap();
        assert_eq!(config.upload.interval(), None);
    }

    #[test]
    fn test_plugin_json_invalid() {
        assert!(matches!(
            Config::from_plugin_json("not json"),
            Err(ConfigError::JsonError(_))
        ));
    }

    #[test]
    fn test_from_file_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.upload.url, "http://localhost:8080/ingest");
    }

    #[test]
    fn test_from_file_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"configuration": {"url": "http://h/x", "handlebarsTemplate": "x"}}"#)
            .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.upload.url, "http://h/x");
    }

    #[test]
    fn test_shipped_example_config() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/datapost.toml");
        let config = Config::from_file(path).unwrap();
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.upload.interval(), Some(Duration::from_secs(60)));
        assert_eq!(config.upload.paths.len(), 4);
        assert_eq!(config.upload.paths[1].conversion(), Some(("m/s", "knot")));
    }

    #[test]
    fn test_from_file_missing() {
        let err = Config::from_file("/nonexistent/datapost.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(err.to_string().contains("/nonexistent/datapost.toml"));
    }
}
