//! Trait abstractions for lighting-service operations.
//!
//! These traits enable dependency injection for testability and modularity.
//! Services depend on traits rather than concrete implementations.

use async_trait::async_trait;

use crate::lifx::client::LightingResult;
use crate::lifx::types::{Light, LightState, Scene};

/// Trait for reading the account's lights and scenes.
///
/// Used once by bootstrap to resolve the light roster and scene ids.
#[async_trait]
pub trait LightDiscovery: Send + Sync {
    /// Lists every light on the account.
    async fn list_lights(&self) -> LightingResult<Vec<Light>>;

    /// Lists every scene on the account.
    async fn list_scenes(&self) -> LightingResult<Vec<Scene>>;
}

/// Trait for commanding lights.
///
/// Used by `LightDispatcher` for every per-notification command.
#[async_trait]
pub trait LightControl: Send + Sync {
    /// Applies a state change to the lights matched by `selector`.
    ///
    /// # Arguments
    /// * `selector` - API selector (`all`, `label:<name>`, `id:<id>`)
    /// * `state` - Power, and optionally colour, brightness and transition time
    async fn set_state(&self, selector: &str, state: &LightState) -> LightingResult<()>;

    /// Activates a stored scene by its uuid.
    async fn activate_scene(&self, scene_id: &str) -> LightingResult<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Combined Traits (for trait objects)
// ─────────────────────────────────────────────────────────────────────────────

/// Combined trait for all lighting operations.
///
/// Used by bootstrap, which needs discovery first and then hands the same
/// client to the dispatcher as a `LightControl`.
pub trait LightingClient: LightDiscovery + LightControl {}

/// Blanket implementation for any type implementing both traits.
impl<T: LightDiscovery + LightControl> LightingClient for T {}
