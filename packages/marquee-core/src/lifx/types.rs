//! Domain types for the LIFX HTTP API.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol_constants::{ID_SELECTOR_PREFIX, LABEL_SELECTOR_PREFIX};

/// A light as reported by `GET /lights/all`.
///
/// The API returns many more fields (power, hue, group, location); only the
/// identifiers are needed here and the rest are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    #[serde(default)]
    pub label: String,
}

/// A scene as reported by `GET /scenes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub uuid: String,
    pub name: String,
}

/// Power state sent in a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Power {
    On,
    Off,
}

/// Body of `PUT /lights/{selector}/state`.
///
/// Optional fields are omitted from the request so the light keeps its
/// current value for them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightState {
    pub power: Power,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Transition time in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl LightState {
    /// A plain power-off with no colour change.
    #[must_use]
    pub fn off() -> Self {
        Self {
            power: Power::Off,
            color: None,
            brightness: None,
            duration: None,
        }
    }

    /// Power on with the given colour string (e.g. `rgb:10,20,30`).
    #[must_use]
    pub fn colored(color: impl Into<String>, brightness: f64, duration: f64) -> Self {
        Self {
            power: Power::On,
            color: Some(color.into()),
            brightness: Some(brightness),
            duration: Some(duration),
        }
    }
}

/// How lights are addressed in commands.
///
/// Chosen once at startup: lights listed by name in the configuration are
/// addressed by label, discovered lights by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorMode {
    Label,
    Id,
}

impl SelectorMode {
    /// Builds the API selector for a light name or id.
    #[must_use]
    pub fn selector(self, light: &str) -> String {
        match self {
            SelectorMode::Label => format!("{LABEL_SELECTOR_PREFIX}{light}"),
            SelectorMode::Id => format!("{ID_SELECTOR_PREFIX}{light}"),
        }
    }
}

impl fmt::Display for SelectorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorMode::Label => write!(f, "label"),
            SelectorMode::Id => write!(f, "id"),
        }
    }
}
