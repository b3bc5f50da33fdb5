//! Shared test doubles for the lighting service.
//!
//! Used by dispatcher, pipeline, bootstrap and API tests to avoid duplication.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::lifx::client::{LightingError, LightingResult};
use crate::lifx::traits::{LightControl, LightDiscovery};
use crate::lifx::types::{Light, LightState, Scene};

/// A command received by [`RecordingLights`].
#[derive(Debug, Clone, PartialEq)]
pub enum LightCall {
    SetState { selector: String, state: LightState },
    ActivateScene(String),
}

/// In-memory lighting service that records every command.
#[derive(Default)]
pub struct RecordingLights {
    lights: Vec<Light>,
    scenes: Vec<Scene>,
    failing_selectors: HashSet<String>,
    fail_scenes: bool,
    fail_discovery: bool,
    calls: Mutex<Vec<LightCall>>,
}

impl RecordingLights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lights<I: IntoIterator<Item = (&'static str, &'static str)>>(
        mut self,
        lights: I,
    ) -> Self {
        self.lights = lights
            .into_iter()
            .map(|(id, label)| Light {
                id: id.to_string(),
                label: label.to_string(),
            })
            .collect();
        self
    }

    pub fn with_scenes<I: IntoIterator<Item = (&'static str, &'static str)>>(
        mut self,
        scenes: I,
    ) -> Self {
        self.scenes = scenes
            .into_iter()
            .map(|(name, uuid)| Scene {
                name: name.to_string(),
                uuid: uuid.to_string(),
            })
            .collect();
        self
    }

    /// Makes `set_state` fail for this exact selector.
    pub fn failing(mut self, selector: &str) -> Self {
        self.failing_selectors.insert(selector.to_string());
        self
    }

    pub fn failing_scenes(mut self) -> Self {
        self.fail_scenes = true;
        self
    }

    pub fn failing_discovery(mut self) -> Self {
        self.fail_discovery = true;
        self
    }

    pub fn calls(&self) -> Vec<LightCall> {
        self.calls.lock().clone()
    }

    /// Colour commands only, as `(selector, color)` pairs in call order.
    pub fn colored(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LightCall::SetState { selector, state } => state.color.map(|c| (selector, c)),
                LightCall::ActivateScene(_) => None,
            })
            .collect()
    }

    pub fn activated_scenes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LightCall::ActivateScene(id) => Some(id),
                LightCall::SetState { .. } => None,
            })
            .collect()
    }
}

fn simulated() -> LightingError {
    LightingError::HttpStatus(500, "simulated failure".to_string())
}

#[async_trait]
impl LightDiscovery for RecordingLights {
    async fn list_lights(&self) -> LightingResult<Vec<Light>> {
        if self.fail_discovery {
            return Err(simulated());
        }
        Ok(self.lights.clone())
    }

    async fn list_scenes(&self) -> LightingResult<Vec<Scene>> {
        if self.fail_discovery {
            return Err(simulated());
        }
        Ok(self.scenes.clone())
    }
}

#[async_trait]
impl LightControl for RecordingLights {
    async fn set_state(&self, selector: &str, state: &LightState) -> LightingResult<()> {
        self.calls.lock().push(LightCall::SetState {
            selector: selector.to_string(),
            state: state.clone(),
        });
        if self.failing_selectors.contains(selector) {
            return Err(simulated());
        }
        Ok(())
    }

    async fn activate_scene(&self, scene_id: &str) -> LightingResult<()> {
        self.calls
            .lock()
            .push(LightCall::ActivateScene(scene_id.to_string()));
        if self.fail_scenes {
            return Err(simulated());
        }
        Ok(())
    }
}
