//! Per-notification orchestration.
//!
//! [`PlaybackPipeline::handle`] classifies a notification and drives the
//! cache, palette extractor and dispatcher for it. The pipeline holds no
//! mutable state; everything it needs is fixed at startup.

use std::sync::Arc;

use crate::artwork::cache::{CacheKey, CacheLookup, ThumbnailCache};
use crate::artwork::palette::{extract_blocking, PaletteExtractor};
use crate::error::MarqueeError;
use crate::lifx::grouping::LightGrouping;
use crate::services::event_router::{
    classify, Classification, ClassifyError, EventKind, IgnoreReason, MediaEvent, PlayerFilter,
    RawNotification,
};
use crate::services::light_dispatcher::{DispatchReport, LightDispatcher};

/// Resolved scene uuids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneIds {
    /// Activated on pause and stop.
    pub pause: String,
    /// Activated on play when no artwork is available.
    pub play: String,
}

/// Startup-time decisions about how palettes reach the lights.
#[derive(Debug, Clone)]
pub struct LightingPlan {
    pub grouping: LightGrouping,
    pub scenes: SceneIds,
    /// Already clamped to the number of lights.
    pub color_count: usize,
    pub quality: u32,
    pub brightness: f64,
    pub duration: f64,
}

/// What a handled notification did.
#[derive(Debug)]
pub enum Outcome {
    /// The notification needed no action.
    Ignored(IgnoreReason),
    /// The pause scene was requested.
    Paused { scene_applied: bool },
    /// The artwork entry was removed and the pause scene requested.
    Stopped {
        evicted: bool,
        scene_applied: bool,
    },
    /// Playback started without artwork; the play scene was requested.
    PlaySceneActivated { scene_applied: bool },
    /// A palette was extracted and sent to the lights.
    PaletteApplied {
        lookup: CacheLookup,
        report: DispatchReport,
    },
    /// Artwork could not be stored or decoded; the lights were left alone.
    PaletteSkipped(MarqueeError),
}

pub struct PlaybackPipeline {
    filter: PlayerFilter,
    cache: ThumbnailCache,
    extractor: Arc<dyn PaletteExtractor>,
    dispatcher: LightDispatcher,
    plan: LightingPlan,
}

impl PlaybackPipeline {
    #[must_use]
    pub fn new(
        filter: PlayerFilter,
        cache: ThumbnailCache,
        extractor: Arc<dyn PaletteExtractor>,
        dispatcher: LightDispatcher,
        plan: LightingPlan,
    ) -> Self {
        Self {
            filter,
            cache,
            extractor,
            dispatcher,
            plan,
        }
    }

    #[must_use]
    pub fn plan(&self) -> &LightingPlan {
        &self.plan
    }

    #[must_use]
    pub fn cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    /// Handles one notification.
    ///
    /// Only classification failures are returned as errors. Lighting, cache
    /// and artwork problems are logged and reported in the [`Outcome`]; the
    /// notification is still acknowledged.
    pub async fn handle(&self, raw: RawNotification) -> Result<Outcome, ClassifyError> {
        let event = match classify(&raw, &self.filter) {
            Ok(Classification::Action(event)) => event,
            Ok(Classification::Ignored(reason)) => {
                log::debug!("[Pipeline] Ignoring notification: {}", reason);
                return Ok(Outcome::Ignored(reason));
            }
            Err(e) => {
                log::error!("[Pipeline] Rejecting notification: {}", e);
                return Err(e);
            }
        };

        let outcome = match event.kind {
            EventKind::Pause => Outcome::Paused {
                scene_applied: self.activate(&self.plan.scenes.pause).await,
            },
            EventKind::Stop => {
                let key = required_key(&event)?;
                let evicted = self.cache.evict(key).await;
                Outcome::Stopped {
                    evicted,
                    scene_applied: self.activate(&self.plan.scenes.pause).await,
                }
            }
            EventKind::Play | EventKind::Resume => {
                let key = required_key(&event)?;
                let image = raw.thumb.as_deref().filter(|b| !b.is_empty());
                self.play(key, image).await
            }
        };

        log::debug!("[Pipeline] {} handled: {:?}", event.kind, outcome);
        Ok(outcome)
    }

    async fn play(&self, key: &CacheKey, image: Option<&[u8]>) -> Outcome {
        let lookup = match self.cache.fetch_or_create(key, image).await {
            Ok(lookup) => lookup,
            Err(e) => {
                log::error!("[Pipeline] Could not store artwork for {}: {}", key, e);
                return Outcome::PaletteSkipped(e.into());
            }
        };

        let Some(path) = lookup.path().map(ToOwned::to_owned) else {
            return Outcome::PlaySceneActivated {
                scene_applied: self.activate(&self.plan.scenes.play).await,
            };
        };

        let palette = match extract_blocking(
            Arc::clone(&self.extractor),
            path,
            self.plan.color_count,
            self.plan.quality,
        )
        .await
        {
            Ok(palette) => palette,
            Err(e) => {
                log::error!("[Pipeline] Could not extract a palette for {}: {}", key, e);
                log::warn!("[Pipeline] Artwork for {} stays cached until playback stops", key);
                return Outcome::PaletteSkipped(e.into());
            }
        };

        let report = self
            .dispatcher
            .apply_palette(
                &self.plan.grouping,
                &palette,
                self.plan.brightness,
                self.plan.duration,
            )
            .await;
        Outcome::PaletteApplied { lookup, report }
    }

    async fn activate(&self, scene_id: &str) -> bool {
        self.dispatcher.activate_scene(scene_id).await.is_ok()
    }
}

fn required_key(event: &MediaEvent) -> Result<&CacheKey, ClassifyError> {
    event
        .cache_key
        .as_ref()
        .ok_or(ClassifyError::MissingMediaGuid)
}
