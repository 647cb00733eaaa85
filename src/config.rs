// src/config.rs

//! Engine configuration. Every field has a sensible default so an empty
//! JSON object, or no file at all, yields a runnable setup.

use anyhow::{ensure, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name, shown in the window title.
    pub name: String,
    /// Logical screen dimensions and pixel scaling.
    pub screen: ScreenConfig,
    /// Upper bound on update rate. `None` runs uncapped.
    pub max_fps: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            name: String::from("untitled"), // Default: "untitled"
            screen: ScreenConfig::default(),
            max_fps: None, // Default: uncapped
        }
    }
}

/// Logical screen size and the physical size of one logical pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Screen width in logical pixels.
    pub width: i32,
    /// Screen height in logical pixels.
    pub height: i32,
    /// Width of one logical pixel on the output surface.
    pub pixel_width: i32,
    /// Height of one logical pixel on the output surface.
    pub pixel_height: i32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            width: 256,      // Default: 256
            height: 240,     // Default: 240
            pixel_width: 4,  // Default: 4
            pixel_height: 4, // Default: 4
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read, is not valid JSON, or holds
    /// values that do not pass [`EngineConfig::validate`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        debug!("EngineConfig: loaded from {}", path.display());
        Ok(config)
    }

    /// Checks the configuration for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Fails when any screen dimension or pixel scale is non-positive, or
    /// when `max_fps` is set to zero.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.screen.width > 0 && self.screen.height > 0,
            "screen dimensions must be positive, got {}x{}",
            self.screen.width,
            self.screen.height
        );
        ensure!(
            self.screen.pixel_width > 0 && self.screen.pixel_height > 0,
            "pixel scale must be positive, got {}x{}",
            self.screen.pixel_width,
            self.screen.pixel_height
        );
        if let Some(fps) = self.max_fps {
            ensure!(fps > 0, "max_fps must be positive when set");
        }
        Ok(())
    }

    /// The physical window size implied by the screen and pixel dimensions.
    pub fn window_size(&self) -> (i32, i32) {
        (
            self.screen.width * self.screen.pixel_width,
            self.screen.height * self.screen.pixel_height,
        )
    }
}
