//! Fixed protocol constants that should NOT be changed.
//!
//! These values are defined by external interfaces (the LIFX HTTP API and the
//! media server's webhook format) and changing them would break compatibility.

// ─────────────────────────────────────────────────────────────────────────────
// LIFX HTTP API
// ─────────────────────────────────────────────────────────────────────────────

/// Base URL of the LIFX cloud HTTP API.
pub const LIFX_API_BASE: &str = "https://api.lifx.com/v1";

/// Timeout for LIFX HTTP requests (seconds).
///
/// Bounds every lighting call so a hung request only stalls its own notification.
pub const LIFX_TIMEOUT_SECS: u64 = 10;

/// Selector addressing every light on the account.
pub const ALL_LIGHTS_SELECTOR: &str = "all";

/// Prefix for selectors that address a light by its label.
pub const LABEL_SELECTOR_PREFIX: &str = "label:";

/// Prefix for selectors that address a light by its id.
pub const ID_SELECTOR_PREFIX: &str = "id:";

/// Prefix for scene selectors in the activate endpoint.
pub const SCENE_SELECTOR_PREFIX: &str = "scene_id:";

// ─────────────────────────────────────────────────────────────────────────────
// Webhook
// ─────────────────────────────────────────────────────────────────────────────

/// Multipart field carrying the JSON notification document.
pub const PAYLOAD_FIELD: &str = "payload";

/// Multipart field carrying the optional JPEG artwork.
pub const THUMB_FIELD: &str = "thumb";

/// Maximum accepted webhook body size (bytes).
///
/// Artwork is attached inline, so this is well above axum's 2 MiB default.
pub const MAX_WEBHOOK_BODY_SIZE: usize = 16 * 1024 * 1024;

/// Body returned for every acknowledged notification.
pub const ACK_BODY: &str = "ok";

// ─────────────────────────────────────────────────────────────────────────────
// Artwork Cache
// ─────────────────────────────────────────────────────────────────────────────

/// File name of the stored artwork inside each cache entry directory.
pub const THUMBNAIL_FILE_NAME: &str = "thumb.jpg";

/// Prefix of in-flight staging directories inside the cache root.
pub const STAGING_DIR_PREFIX: &str = ".staging-";

// ─────────────────────────────────────────────────────────────────────────────
// Application Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Service identifier reported by the health endpoint.
pub const SERVICE_ID: &str = "marquee";
