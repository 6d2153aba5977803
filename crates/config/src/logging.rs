//! Logging configuration
//!
//! Controls the diagnostic channel: every tick, delivery outcome and
//! recoverable error is reported through `tracing` at these settings.

use std::str::FromStr;

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - very verbose
    Trace,
    /// Debug level - per-tick template output, headers and targets
    Debug,
    /// Info level - lifecycle events (default)
    #[default]
    Info,
    /// Warn level - delivery and conversion failures
    Warn,
    /// Error level - errors only
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// JSON structured logging
    Json,
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// directives = "reqwest=warn,hyper=warn"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level for datapost itself
    /// Default: info
    pub level: LogLevel,

    /// Output format (console, json)
    /// Default: console
    pub format: LogFormat,

    /// Extra `EnvFilter` directives appended after the level
    pub directives: Option<String>,
}

impl LogConfig {
    /// Build the filter string, letting `level` override the configured one
    pub fn filter(&self, level: Option<LogLevel>) -> String {
        let level = level.unwrap_or(self.level).as_str();
        match self.directives.as_deref().map(str::trim) {
            Some(extra) if !extra.is_empty() => format!("{level},{extra}"),
            _ => level.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty() {
        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
        assert!(config.directives.is_none());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
level = "debug"
format = "json"
directives = "reqwest=warn"
"#;
        let config: LogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter(None), "debug,reqwest=warn");
    }

    #[test]
    fn test_filter_override() {
        let config = LogConfig::default();
        assert_eq!(config.filter(None), "info");
        assert_eq!(config.filter(Some(LogLevel::Trace)), "trace");
    }

    #[test]
    fn test_filter_ignores_blank_directives() {
        let config = LogConfig {
            directives: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(config.filter(None), "info");
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
