//! Light command dispatch.
//!
//! Maps a palette onto the static light grouping and activates scenes.
//! Lighting failures never abort a notification: per-light errors are logged
//! and collected so sibling lights still change colour.

use std::sync::Arc;

use futures::future::join_all;

use crate::artwork::palette::Palette;
use crate::lifx::client::LightingResult;
use crate::lifx::grouping::LightGrouping;
use crate::lifx::traits::LightControl;
use crate::lifx::types::LightState;
use crate::protocol_constants::ALL_LIGHTS_SELECTOR;

/// Outcome of [`LightDispatcher::apply_palette`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Number of lights that accepted their colour.
    pub succeeded: usize,
    /// (selector, error) pairs for every failed command, including the bulk off.
    pub failures: Vec<(String, String)>,
    /// Groups left off because the palette had fewer colours than groups.
    pub unlit_groups: usize,
}

/// Issues power, colour and scene commands to the lighting service.
pub struct LightDispatcher {
    lights: Arc<dyn LightControl>,
}

impl LightDispatcher {
    #[must_use]
    pub fn new(lights: Arc<dyn LightControl>) -> Self {
        Self { lights }
    }

    /// Turns every light off, then colours group `i` with `palette[i]`.
    ///
    /// Groups without a matching colour stay off. Commands within the
    /// palette phase run concurrently; they all start after the bulk off
    /// has completed.
    pub async fn apply_palette(
        &self,
        grouping: &LightGrouping,
        palette: &Palette,
        brightness: f64,
        duration: f64,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        if let Err(e) = self
            .lights
            .set_state(ALL_LIGHTS_SELECTOR, &LightState::off())
            .await
        {
            log::warn!("[Dispatch] Failed to turn off all lights: {}", e);
            report
                .failures
                .push((ALL_LIGHTS_SELECTOR.to_string(), e.to_string()));
        }

        let mut commands = Vec::with_capacity(grouping.light_count());
        for (index, group) in grouping.groups().iter().enumerate() {
            let Some(color) = palette.get(index) else {
                report.unlit_groups += 1;
                continue;
            };
            let state = LightState::colored(color.to_string(), brightness, duration);
            for selector in group.selectors() {
                let lights = Arc::clone(&self.lights);
                let state = state.clone();
                let selector = selector.clone();
                commands.push(async move {
                    log::debug!(
                        "[Dispatch] {} -> {}",
                        selector,
                        state.color.as_deref().unwrap_or_default()
                    );
                    lights
                        .set_state(&selector, &state)
                        .await
                        .map_err(|e| (selector, e.to_string()))
                });
            }
        }

        if report.unlit_groups > 0 {
            log::info!(
                "[Dispatch] Palette has {} colour(s) for {} group(s); {} group(s) left off",
                palette.len(),
                grouping.len(),
                report.unlit_groups
            );
        }

        for result in join_all(commands).await {
            match result {
                Ok(()) => report.succeeded += 1,
                Err((selector, error)) => {
                    log::warn!("[Dispatch] Failed to set {}: {}", selector, error);
                    report.failures.push((selector, error));
                }
            }
        }

        report
    }

    /// Activates `scene_id`, logging any failure.
    pub async fn activate_scene(&self, scene_id: &str) -> LightingResult<()> {
        match self.lights.activate_scene(scene_id).await {
            Ok(()) => {
                log::debug!("[Dispatch] Activated scene {}", scene_id);
                Ok(())
            }
            Err(e) => {
                log::warn!("[Dispatch] Failed to activate scene {}: {}", scene_id, e);
                Err(e)
            }
        }
    }
}
