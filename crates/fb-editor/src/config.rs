//! Editor configuration.
//!
//! Every field has a default; a JSON config may set any subset of them.

use fb_core::CanvasSize;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::history::DEFAULT_HISTORY_DEPTH;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for an [`Editor`](crate::Editor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Grid cell size in canvas units.
    pub grid_size: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    /// Suppress element creation; existing elements stay editable.
    pub edit_only: bool,
    pub history_depth: usize,
    pub save_debounce_ms: u64,
    /// Delay before a freshly stamped element is deselected.
    pub deselect_delay_ms: u64,
    /// Canvas size for a diagram that has never been stored.
    pub canvas: CanvasSize,
    pub expand_step: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            show_grid: true,
            snap_to_grid: true,
            edit_only: false,
            history_depth: DEFAULT_HISTORY_DEPTH,
            save_debounce_ms: 1000,
            deselect_delay_ms: 100,
            canvas: CanvasSize::default(),
            expand_step: 200,
        }
    }
}

impl EditorConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn deselect_delay(&self) -> Duration {
        Duration::from_millis(self.deselect_delay_ms)
    }

    /// Grid size used for snapping, or `None` with snapping off.
    pub fn snap_grid(&self) -> Option<f64> {
        (self.snap_to_grid && self.grid_size > 0.0).then_some(self.grid_size)
    }
}
