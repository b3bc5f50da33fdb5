//! LIFX HTTP API client.
//!
//! Implements [`LightDiscovery`] and [`LightControl`] against the public cloud
//! API. Every request carries the account token as a bearer credential and is
//! bounded by the shared client's timeout.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::lifx::traits::{LightControl, LightDiscovery};
use crate::lifx::types::{Light, LightState, Scene};
use crate::protocol_constants::{ALL_LIGHTS_SELECTOR, LIFX_API_BASE, SCENE_SELECTOR_PREFIX};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur when talking to the lighting service.
#[derive(Debug, Error)]
pub enum LightingError {
    /// HTTP request to the API failed (connect, timeout, decode).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success HTTP status.
    #[error("HTTP error {0}: {1}")]
    HttpStatus(u16, String),
}

/// Convenient Result alias for lighting operations.
pub type LightingResult<T> = Result<T, LightingError>;

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Concrete lighting client for the LIFX cloud API.
pub struct LifxClient {
    http: Client,
    api_key: String,
    base_url: Url,
}

impl LifxClient {
    /// Creates a client for the public API endpoint.
    ///
    /// # Arguments
    /// * `http` - Shared HTTP client (carries the request timeout)
    /// * `api_key` - LIFX personal access token
    #[must_use]
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        let base_url = Url::parse(LIFX_API_BASE).expect("LIFX_API_BASE is a valid URL");
        Self::with_base_url(http, api_key, base_url)
    }

    /// Creates a client for an alternative endpoint (API proxy, local bridge).
    #[must_use]
    pub fn with_base_url(http: Client, api_key: impl Into<String>, base_url: Url) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url,
        }
    }

    /// Builds an endpoint URL from path segments, percent-encoding each one.
    ///
    /// Selectors such as `label:Living Room` end up as a single encoded segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, action: &str, request: RequestBuilder) -> LightingResult<Response> {
        let start = std::time::Instant::now();
        let res = request.bearer_auth(&self.api_key).send().await;

        log::debug!(
            "[Lifx] {} completed in {:?}: {:?}",
            action,
            start.elapsed(),
            res.as_ref().map(|r| r.status())
        );

        let res = res?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(LightingError::HttpStatus(status.as_u16(), body));
        }

        Ok(res)
    }

    async fn get_json<T: DeserializeOwned>(&self, action: &str, url: Url) -> LightingResult<T> {
        let res = self.send(action, self.http.get(url)).await?;
        Ok(res.json::<T>().await?)
    }
}

#[async_trait]
impl LightDiscovery for LifxClient {
    async fn list_lights(&self) -> LightingResult<Vec<Light>> {
        let url = self.endpoint(&["lights", ALL_LIGHTS_SELECTOR]);
        self.get_json("ListLights", url).await
    }

    async fn list_scenes(&self) -> LightingResult<Vec<Scene>> {
        let url = self.endpoint(&["scenes"]);
        self.get_json("ListScenes", url).await
    }
}

#[async_trait]
impl LightControl for LifxClient {
    async fn set_state(&self, selector: &str, state: &LightState) -> LightingResult<()> {
        let url = self.endpoint(&["lights", selector, "state"]);
        log::debug!("[Lifx] SetState {} -> {:?}", selector, state);
        self.send("SetState", self.http.put(url).json(state))
            .await
            .map(drop)
    }

    async fn activate_scene(&self, scene_id: &str) -> LightingResult<()> {
        let selector = format!("{SCENE_SELECTOR_PREFIX}{scene_id}");
        let url = self.endpoint(&["scenes", &selector, "activate"]);
        log::debug!("[Lifx] ActivateScene {}", scene_id);
        self.send("ActivateScene", self.http.put(url)).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LifxClient {
        LifxClient::new(Client::new(), "token")
    }

    #[test]
    fn endpoint_encodes_label_selectors() {
        let url = client().endpoint(&["lights", "label:Living Room", "state"]);
        assert_eq!(
            url.as_str(),
            "https://api.lifx.com/v1/lights/label:Living%20Room/state"
        );
    }

    #[test]
    fn endpoint_builds_scene_activation_path() {
        let url = client().endpoint(&["scenes", "scene_id:abc-123", "activate"]);
        assert_eq!(
            url.as_str(),
            "https://api.lifx.com/v1/scenes/scene_id:abc-123/activate"
        );
    }

    #[test]
    fn endpoint_respects_custom_base_with_trailing_slash() {
        let base = Url::parse("http://127.0.0.1:8080/v1/").unwrap();
        let client = LifxClient::with_base_url(Client::new(), "token", base);
        let url = client.endpoint(&["scenes"]);
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v1/scenes");
    }
}
