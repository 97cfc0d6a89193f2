//! TOML configuration for the TUI.
//!
//! Lives at `<config_dir>/stepscope/config.toml`. Every key is optional.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::widgets::zoom_control::snap_zoom;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Directory holding the `*.safetensors` checkpoints.
    pub checkpoint_dir: PathBuf,
    /// Initial zoom size, snapped onto the slider grid.
    pub zoom_size: u16,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    /// Input poll interval in milliseconds.
    pub tick_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: PathBuf::from("."),
            zoom_size: 300,
            log_filter: "info".to_string(),
            tick_ms: 50,
        }
    }
}

impl TuiConfig {
    pub fn default_path() -> PathBuf {
        config_root().join("config.toml")
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: TuiConfig = toml::from_str(content)?;
        config.zoom_size = snap_zoom(config.zoom_size);
        config.tick_ms = config.tick_ms.max(1);
        Ok(config)
    }
}

/// `<config_dir>/stepscope`, falling back to the working directory.
pub fn config_root() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stepscope")
}
