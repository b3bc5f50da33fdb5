//! Marquee Core - ambient light palettes from media playback.
//!
//! This crate turns media server playback webhooks into colour changes on a
//! set of LIFX lights. When a movie or episode starts, the dominant colours
//! of its artwork are mapped onto fixed groups of lights; pause and stop
//! activate a configured scene.
//!
//! # Architecture
//!
//! - [`services`]: Notification classification, light dispatch and the per-notification pipeline
//! - [`artwork`]: On-disk thumbnail cache and palette extraction
//! - [`lifx`]: LIFX HTTP API client and light grouping
//! - [`state`]: Typed application configuration
//! - [`bootstrap`]: Composition root
//! - [`api`]: HTTP router and server startup
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`LightDiscovery`](lifx::LightDiscovery) / [`LightControl`](lifx::LightControl): Lighting service
//! - [`PaletteExtractor`](artwork::PaletteExtractor): Colour extraction from an image file

#![warn(clippy::all)]

pub mod api;
pub mod artwork;
pub mod bootstrap;
pub mod error;
pub mod lifx;
pub mod protocol_constants;
pub mod services;
pub mod state;

// Re-export commonly used types at the crate root
pub use error::{ErrorCode, MarqueeError, MarqueeResult};
pub use state::{Config, LightingConfig, PaletteConfig, SceneConfig};

// Re-export domain types
pub use artwork::{CacheKey, CacheLookup, ColorThiefExtractor, Palette, Rgb, ThumbnailCache};
pub use lifx::{LifxClient, LightGrouping, LightRoster, LightingClient, SelectorMode};
pub use services::{Outcome, PlaybackPipeline, PlayerFilter};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_services, bootstrap_with_client, BootstrappedServices};

// Re-export API types
pub use api::{start_server, AppState, ServerError};
