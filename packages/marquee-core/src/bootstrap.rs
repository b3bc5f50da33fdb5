//! Application bootstrap and dependency wiring.
//!
//! This module contains the composition root: the single place where the
//! lighting client, artwork cache and pipeline are created and wired
//! together. Everything resolved here (light order, grouping, scene ids)
//! is frozen for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;

use crate::artwork::cache::ThumbnailCache;
use crate::artwork::palette::{ColorThiefExtractor, PaletteExtractor};
use crate::error::{MarqueeError, MarqueeResult};
use crate::lifx::{LifxClient, LightControl, LightGrouping, LightRoster, LightingClient};
use crate::protocol_constants::LIFX_TIMEOUT_SECS;
use crate::services::{LightDispatcher, LightingPlan, PlaybackPipeline, SceneIds};
use crate::state::{Config, SceneConfig};

/// Container for all bootstrapped services.
pub struct BootstrappedServices {
    /// Handles every inbound notification.
    pub pipeline: Arc<PlaybackPipeline>,
    /// The lights under control, in group order.
    pub roster: LightRoster,
}

/// Creates the shared HTTP client for all lighting-service calls.
fn create_http_client() -> MarqueeResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(LIFX_TIMEOUT_SECS))
        .build()
        .map_err(|e| MarqueeError::Configuration(format!("Failed to create HTTP client: {e}")))
}

/// Bootstraps all services against the LIFX cloud API.
///
/// # Errors
///
/// Returns a configuration error if the settings are invalid, no lights can
/// be found, or a configured scene does not exist on the account.
pub async fn bootstrap_services(config: &Config) -> MarqueeResult<BootstrappedServices> {
    let http = create_http_client()?;
    let client = Arc::new(LifxClient::new(http, config.lighting.api_key.clone()));
    let rng = StdRng::from_rng(&mut rand::rng());
    bootstrap_with_client(config, client, Arc::new(ColorThiefExtractor), rng).await
}

/// Bootstraps all services with an explicit lighting client and extractor.
///
/// Wiring order:
///
/// 1. Validate configuration
/// 2. Resolve the light roster (configured names, or shuffled discovery)
/// 3. Resolve scene names to uuids
/// 4. Clamp the colour count and partition the lights
/// 5. Open the artwork cache
/// 6. Assemble the pipeline
pub async fn bootstrap_with_client<C, R>(
    config: &Config,
    client: Arc<C>,
    extractor: Arc<dyn PaletteExtractor>,
    mut rng: R,
) -> MarqueeResult<BootstrappedServices>
where
    C: LightingClient + 'static,
    R: Rng + Send,
{
    config.validate()?;

    let roster = if config.lighting.lights.is_empty() {
        let discovered = client.list_lights().await.map_err(|e| {
            MarqueeError::Configuration(format!("Failed to list lights: {e}"))
        })?;
        LightRoster::discovered(discovered, &mut rng)
    } else {
        LightRoster::named(&config.lighting.lights)
    };
    if roster.is_empty() {
        return Err(MarqueeError::Configuration(
            "No lights configured or found on the account".to_string(),
        ));
    }
    log::debug!(
        "[Bootstrap] Lights ({} by {}): {:?}",
        roster.len(),
        roster.mode(),
        roster.lights()
    );

    let scenes = resolve_scenes(client.as_ref(), &config.scenes).await?;

    let color_count = config.palette.color_count.min(roster.len());
    let grouping = LightGrouping::partition(&roster.selectors(), color_count);
    log::debug!("[Bootstrap] Number of colors: {}", color_count);
    log::debug!("[Bootstrap] Color quality: {}", config.palette.quality);

    let cache = ThumbnailCache::open(&config.cache_dir).await?;

    let lights: Arc<dyn LightControl> = client;
    let plan = LightingPlan {
        grouping,
        scenes,
        color_count,
        quality: config.palette.quality,
        brightness: config.lighting.brightness,
        duration: config.lighting.duration,
    };
    let pipeline = PlaybackPipeline::new(
        config.players.clone(),
        cache,
        extractor,
        LightDispatcher::new(lights),
        plan,
    );

    log::info!(
        "[Bootstrap] Controlling {} light(s) in {} group(s)",
        roster.len(),
        color_count
    );

    Ok(BootstrappedServices {
        pipeline: Arc::new(pipeline),
        roster,
    })
}

async fn resolve_scenes<C>(client: &C, names: &SceneConfig) -> MarqueeResult<SceneIds>
where
    C: LightingClient + ?Sized,
{
    let scenes = client
        .list_scenes()
        .await
        .map_err(|e| MarqueeError::Configuration(format!("Failed to list scenes: {e}")))?;
    let by_name: HashMap<String, String> = scenes
        .into_iter()
        .map(|scene| (scene.name, scene.uuid))
        .collect();
    log::debug!("[Bootstrap] Scenes: {:?}", by_name);

    let lookup = |name: &str| {
        by_name.get(name).cloned().ok_or_else(|| {
            MarqueeError::Configuration(format!("Scene '{name}' not found on the account"))
        })
    };

    Ok(SceneIds {
        pause: lookup(&names.pause)?,
        play: lookup(&names.play)?,
    })
}
