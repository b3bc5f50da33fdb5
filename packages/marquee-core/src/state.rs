//! Typed, validated application configuration.
//!
//! [`Config`] is built once at startup by the server binary and only read
//! afterwards. Each section validates its own ranges; [`Config::validate`]
//! runs them all and reports the first problem as a configuration error.

use std::path::PathBuf;

use crate::error::{MarqueeError, MarqueeResult};
use crate::services::event_router::PlayerFilter;

/// Lighting-service credentials, light selection and transition settings.
#[derive(Clone, PartialEq)]
pub struct LightingConfig {
    /// LIFX personal access token.
    pub api_key: String,

    /// Light names to control, in group order. Empty means every light on
    /// the account, in shuffled order.
    pub lights: Vec<String>,

    /// Brightness applied with each palette colour (0.0 to 1.0).
    pub brightness: f64,

    /// Colour transition time (seconds).
    pub duration: f64,
}

impl LightingConfig {
    /// Creates a lighting section with default brightness and duration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            lights: Vec::new(),
            brightness: 0.35,
            duration: 2.0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("LIFX api key is required".to_string());
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(format!(
                "brightness must be between 0 and 1 (got {})",
                self.brightness
            ));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(format!(
                "duration must be a non-negative number of seconds (got {})",
                self.duration
            ));
        }
        Ok(())
    }
}

// The token stays out of logs.
impl std::fmt::Debug for LightingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightingConfig")
            .field("api_key", &"<redacted>")
            .field("lights", &self.lights)
            .field("brightness", &self.brightness)
            .field("duration", &self.duration)
            .finish()
    }
}

/// Palette extraction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteConfig {
    /// Number of colours (and therefore light groups) to extract.
    pub color_count: usize,

    /// Sampling stride for extraction; 1 samples every pixel.
    pub quality: u32,
}

impl PaletteConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.color_count == 0 {
            return Err("color count must be >= 1".to_string());
        }
        if self.quality == 0 {
            return Err("color quality must be >= 1".to_string());
        }
        Ok(())
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            color_count: 4,
            quality: 1,
        }
    }
}

/// Names of the scenes used when no palette applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneConfig {
    pub pause: String,
    pub play: String,
}

impl SceneConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.pause.trim().is_empty() {
            return Err("pause scene name is required".to_string());
        }
        if self.play.trim().is_empty() {
            return Err("play scene name is required".to_string());
        }
        Ok(())
    }
}

/// Configuration for the Marquee service.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Port for the webhook server.
    pub port: u16,
    pub lighting: LightingConfig,
    pub palette: PaletteConfig,
    pub players: PlayerFilter,
    pub scenes: SceneConfig,
    /// Root of the artwork cache.
    pub cache_dir: PathBuf,
}

impl Config {
    /// Creates a configuration with every optional setting at its default.
    pub fn new(api_key: impl Into<String>, scenes: SceneConfig) -> Self {
        Self {
            port: 5000,
            lighting: LightingConfig::new(api_key),
            palette: PaletteConfig::default(),
            players: PlayerFilter::default(),
            scenes,
            cache_dir: PathBuf::from("./tmp"),
        }
    }

    /// Validates every section.
    pub fn validate(&self) -> MarqueeResult<()> {
        self.lighting
            .validate()
            .and_then(|()| self.palette.validate())
            .and_then(|()| self.scenes.validate())
            .map_err(MarqueeError::Configuration)
    }
}
