//! Application configuration types
//!
//! Mirrors `config/default.toml`.

use anyhow::{bail, Result};
use monet_core::DriverConfig;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub drawing: DrawingConfig,
    pub canvas: CanvasConfig,
}

/// Drawing loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingConfig {
    pub provider: String,
    /// Provider default model when unset
    #[serde(default)]
    pub model: Option<String>,
    pub max_iterations: u32,
    pub max_output_tokens: u32,
    pub thinking_enabled: bool,
    pub thinking_budget: u32,
    pub export_scale: f32,
    pub max_empty_streak: u32,
    pub output_root: String,
}

impl DrawingConfig {
    /// Driver settings for a run
    pub fn driver_config(&self, verbose: bool) -> Result<DriverConfig> {
        if self.max_empty_streak == 0 {
            bail!("drawing.max_empty_streak must be at least 1");
        }
        Ok(DriverConfig {
            max_output_tokens: self.max_output_tokens,
            export_scale: self.export_scale,
            max_empty_streak: self.max_empty_streak,
            verbose,
        })
    }
}

/// Initial canvas settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub background: String,
}
