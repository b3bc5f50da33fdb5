//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.
//!
//! ```yaml
//! logfile: /var/log/marquee.log
//! port: 5000
//! lifx:
//!   api_key: c8f2...
//!   lights: Desk, Couch, TV
//!   default_pause_theme: Relax
//!   default_play_theme: Bright
//! plex:
//!   local_players_only: true
//!   ignore_player_uuids: none
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use marquee_core::{
    Config, LightingConfig, MarqueeError, MarqueeResult, PaletteConfig, PlayerFilter, SceneConfig,
};
use serde::Deserialize;

/// A list given either as a YAML sequence or as a comma-separated string.
///
/// The string `none` means an empty list.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Text(String),
}

impl StringList {
    pub fn items(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Text(text) if text.trim().eq_ignore_ascii_case("none") => Vec::new(),
            Self::Text(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Default for StringList {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// `lifx:` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LifxSection {
    /// Override: `MARQUEE_API_KEY`
    pub api_key: Option<String>,

    /// Light names; empty uses every light on the account.
    /// Override: `MARQUEE_LIGHTS`
    pub lights: StringList,

    /// Override: `MARQUEE_BRIGHTNESS`
    pub brightness: f64,

    /// Override: `MARQUEE_DURATION`
    pub duration: f64,

    pub num_colors: usize,

    pub color_quality: u32,

    /// Scene activated on pause and stop.
    pub default_pause_theme: Option<String>,

    /// Scene activated on play when there is no artwork.
    pub default_play_theme: Option<String>,
}

impl Default for LifxSection {
    fn default() -> Self {
        let lighting = LightingConfig::new(String::new());
        let palette = PaletteConfig::default();
        Self {
            api_key: None,
            lights: StringList::default(),
            brightness: lighting.brightness,
            duration: lighting.duration,
            num_colors: palette.color_count,
            color_quality: palette.quality,
            default_pause_theme: None,
            default_play_theme: None,
        }
    }
}

/// `plex:` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PlexSection {
    /// Override: `MARQUEE_LOCAL_PLAYERS_ONLY`
    pub local_players_only: bool,

    /// Override: `MARQUEE_IGNORE_PLAYER_UUIDS`
    pub ignore_player_uuids: StringList,
}

impl Default for PlexSection {
    fn default() -> Self {
        Self {
            local_players_only: true,
            ignore_player_uuids: StringList::default(),
        }
    }
}

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// File that receives a copy of every log record. Required.
    pub logfile: Option<PathBuf>,

    /// Port to bind the webhook server to.
    pub port: u16,

    /// Directory for cached artwork.
    pub cache_dir: PathBuf,

    pub lifx: LifxSection,

    pub plex: PlexSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            logfile: None,
            port: 5000,
            cache_dir: PathBuf::from("./tmp"),
            lifx: LifxSection::default(),
            plex: PlexSection::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup` (environment variables in production).
    ///
    /// Unparseable numeric or boolean values are ignored.
    // Note: MARQUEE_PORT, MARQUEE_LOG_FILE and MARQUEE_CACHE_DIR are handled
    // by clap via #[arg(env = ...)] in main.rs
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("MARQUEE_API_KEY") {
            self.lifx.api_key = Some(val);
        }

        if let Some(val) = lookup("MARQUEE_LIGHTS") {
            self.lifx.lights = StringList::Text(val);
        }

        if let Some(val) = lookup("MARQUEE_BRIGHTNESS") {
            if let Ok(brightness) = val.parse() {
                self.lifx.brightness = brightness;
            }
        }

        if let Some(val) = lookup("MARQUEE_DURATION") {
            if let Ok(duration) = val.parse() {
                self.lifx.duration = duration;
            }
        }

        if let Some(val) = lookup("MARQUEE_LOCAL_PLAYERS_ONLY") {
            if let Ok(local) = val.parse() {
                self.plex.local_players_only = local;
            }
        }

        if let Some(val) = lookup("MARQUEE_IGNORE_PLAYER_UUIDS") {
            self.plex.ignore_player_uuids = StringList::Text(val);
        }
    }

    /// The configured logfile.
    pub fn logfile(&self) -> MarqueeResult<&Path> {
        self.logfile
            .as_deref()
            .ok_or_else(|| MarqueeError::Configuration("a logfile path is required".into()))
    }

    /// Converts to marquee-core's validated Config type.
    pub fn to_core_config(&self) -> MarqueeResult<Config> {
        let required = |value: &Option<String>, what: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| MarqueeError::Configuration(format!("{what} is required")))
        };

        let config = Config {
            port: self.port,
            lighting: LightingConfig {
                api_key: required(&self.lifx.api_key, "LIFX api key")?,
                lights: self.lifx.lights.items(),
                brightness: self.lifx.brightness,
                duration: self.lifx.duration,
            },
            palette: PaletteConfig {
                color_count: self.lifx.num_colors,
                quality: self.lifx.color_quality,
            },
            players: PlayerFilter::new(
                self.plex.ignore_player_uuids.items(),
                self.plex.local_players_only,
            ),
            scenes: SceneConfig {
                pause: required(&self.lifx.default_pause_theme, "default pause theme")?,
                play: required(&self.lifx.default_play_theme, "default play theme")?,
            },
            cache_dir: self.cache_dir.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}
