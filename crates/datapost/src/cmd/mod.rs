//! Command implementations for the datapost CLI

pub mod render;
pub mod run;
pub mod schema;
pub mod units;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use datapost_config::Config;

/// Paths tried when no `--config` is given
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["configs/datapost.toml", "datapost.toml"];

/// Load the configuration file.
///
/// An explicit path must exist. Without one, the default locations are
/// tried in order.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()));
    }

    for candidate in DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from) {
        if candidate.exists() {
            return Config::from_file(&candidate)
                .with_context(|| format!("failed to load config from {}", candidate.display()));
        }
    }

    bail!(
        "no config file given and none found at {}",
        DEFAULT_CONFIG_PATHS.join(" or ")
    )
}
