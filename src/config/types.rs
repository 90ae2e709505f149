//! Configuration types.

use crate::types::InsertEdge;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Board configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub insertion: InsertionConfig,

    /// Reveal settings for the board-wide column loader.
    #[serde(default = "RevealConfig::columns")]
    pub columns: RevealConfig,

    /// Reveal settings for each column's task loader.
    #[serde(default = "RevealConfig::tasks")]
    pub tasks: RevealConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            insertion: InsertionConfig::default(),
            columns: RevealConfig::columns(),
            tasks: RevealConfig::tasks(),
        }
    }
}

impl BoardConfig {
    /// Reject settings the loaders cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.columns.validate("columns")?;
        self.tasks.validate("tasks")?;
        Ok(())
    }
}

/// Where newly created columns and tasks are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsertionConfig {
    #[serde(default)]
    pub column_edge: InsertEdge,
    #[serde(default)]
    pub task_edge: InsertEdge,
}

/// Batch reveal settings for one loader category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Items revealed initially and per batch.
    pub batch_size: usize,

    /// Simulated latency before a batch appears, in milliseconds.
    pub delay_ms: u64,

    /// Distance from the end of the content, in pixels, at which scrolling
    /// counts as a proximity signal.
    pub edge_threshold_px: f64,
}

impl RevealConfig {
    /// Column loader defaults.
    pub fn columns() -> Self {
        Self {
            batch_size: 4,
            delay_ms: 500,
            edge_threshold_px: 100.0,
        }
    }

    /// Task loader defaults.
    pub fn tasks() -> Self {
        Self {
            batch_size: 15,
            delay_ms: 700,
            edge_threshold_px: 50.0,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.batch_size == 0 {
            return Err(anyhow!("{}.batch_size must be at least 1", name));
        }
        if !self.edge_threshold_px.is_finite() || self.edge_threshold_px < 0.0 {
            return Err(anyhow!(
                "{}.edge_threshold_px must be a non-negative number",
                name
            ));
        }
        Ok(())
    }
}
