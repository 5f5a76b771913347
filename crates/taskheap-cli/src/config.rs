//! Application configuration.
//!
//! Reads `config/default.toml` (or the path given with `--config`).  The
//! `[heap]` table maps onto [`HeapConfig`]; `[log]` carries the default log
//! level.  A missing file falls back to defaults, a malformed one is an error.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use taskheap_kernel::HeapConfig;

/// Settings loaded from the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub heap: HeapConfig,
    pub log: LogConfig,
}

/// The `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Load the application config from `path`.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}
