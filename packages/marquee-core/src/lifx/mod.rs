//! LIFX light control.
//!
//! This module provides the lighting-service side of the pipeline: the HTTP
//! API client, its trait seams, and the startup-time light grouping.
//!
//! # Module Structure
//!
//! - `types` - API domain types (lights, scenes, state changes, selectors)
//! - `traits` - Trait abstractions for testability
//! - `client` - `LifxClient` concrete trait implementation
//! - `grouping` - Light roster ordering and colour-group partitioning

pub mod client;
pub mod grouping;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export domain types
pub use grouping::{LightGroup, LightGrouping, LightRoster};
pub use types::{Light, LightState, Power, Scene, SelectorMode};

// Re-export trait abstractions
pub use traits::{LightControl, LightDiscovery, LightingClient};

// Re-export concrete implementation
pub use client::{LifxClient, LightingError, LightingResult};
