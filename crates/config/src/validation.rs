//! Configuration validation
//!
//! Validates config consistency:
//! - Upload URL and template are present, URL is http(s)
//! - Interval is a finite number that fits a duration
//! - Every path entry has a path and an output name
//! - Conversion units exist and measure the same thing
//! - Header names are not empty
//! - Trigger path is set

use std::time::Duration;

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::source::SourceConfig;
use crate::upload::UploadConfig;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_upload(&config.upload)?;
    validate_source(&config.source)?;
    Ok(())
}

/// Validate the upload section
pub fn validate_upload(upload: &UploadConfig) -> Result<()> {
    let url = upload.url.trim();
    if url.is_empty() {
        return Err(ConfigError::missing_field("upload", "upload", "url"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::invalid_value(
            "upload",
            "upload",
            "url",
            format!("'{url}' must start with http:// or https://"),
        ));
    }

    if upload.template.trim().is_empty() {
        return Err(ConfigError::missing_field("upload", "upload", "template"));
    }

    if let Some(secs) = upload.interval {
        if !secs.is_finite() {
            return Err(ConfigError::invalid_value(
                "upload",
                "upload",
                "interval",
                "must be a finite number of seconds",
            ));
        }
        if secs > 0.0 && Duration::try_from_secs_f64(secs).is_err() {
            return Err(ConfigError::invalid_value(
                "upload",
                "upload",
                "interval",
                format!("{secs} seconds is too large"),
            ));
        }
    }

    for (i, header) in upload.headers.iter().enumerate() {
        if header.name.trim().is_empty() {
            return Err(ConfigError::missing_field("header", format!("#{i}"), "name"));
        }
    }

    for (i, spec) in upload.paths.iter().enumerate() {
        if spec.path.trim().is_empty() {
            return Err(ConfigError::missing_field("path", format!("#{i}"), "path"));
        }
        if spec.name.trim().is_empty() {
            return Err(ConfigError::missing_field("path", &spec.path, "name"));
        }
        if let Some((from, to)) = spec.conversion() {
            datapost_units::check_pair(from, to)
                .map_err(|e| ConfigError::conversion(&spec.name, e))?;
        }
    }

    Ok(())
}

/// Validate the source section
fn validate_source(source: &SourceConfig) -> Result<()> {
    if source.trigger_path.trim().is_empty() {
        return Err(ConfigError::missing_field("source", "source", "trigger_path"));
    }
    if source.refresh.is_zero() {
        return Err(ConfigError::invalid_value(
            "source",
            "source",
            "refresh",
            "must be greater than zero",
        ));
    }
    Ok(())
}
