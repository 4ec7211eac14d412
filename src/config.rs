use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// File looked up in the working directory at start-up.
pub const CONFIG_FILE: &str = "explorer.json";

/// Presentation settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Rows shown in the data preview.
    pub preview_rows: usize,
    /// Decimals printed in heatmap cells.
    pub heatmap_decimals: usize,
    /// Side length of one heatmap cell, in points.
    pub heatmap_cell_size: f32,
    pub scatter_point_radius: f32,
    pub plot_height: f32,
    pub window_size: [f32; 2],
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            heatmap_decimals: 2,
            heatmap_cell_size: 56.0,
            scatter_point_radius: 3.0,
            plot_height: 280.0,
            window_size: [1280.0, 900.0],
        }
    }
}

impl ExplorerConfig {
    /// Load the config file if present. A missing file gives the defaults;
    /// an unreadable one is logged and also gives the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                log::info!("Using settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }

    fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).context("reading config file")?;
        serde_json::from_str(&text).context("parsing config file")
    }
}
