//! CLI commands.

pub mod config;
pub mod extract;
pub mod face;
pub mod models;
pub mod output;
pub mod scan;

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use idscan_core::IdScanConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("idscan")
        .join("config.json")
}

/// Load the configuration from an explicit path, the default location, or
/// fall back to built-in defaults.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<IdScanConfig> {
    if let Some(path) = config_path {
        return IdScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config {}", default_path.display());
        IdScanConfig::from_file(&default_path)
            .with_context(|| format!("failed to load config {}", default_path.display()))
    } else {
        Ok(IdScanConfig::default())
    }
}
