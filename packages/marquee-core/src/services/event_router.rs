//! Webhook classification.
//!
//! Turns a raw multipart notification into either an actionable
//! [`MediaEvent`] or a reason to ignore it. Checks run in a fixed order and
//! the first one that fails decides the outcome:
//!
//! 1. payload present and a JSON object
//! 2. `event` present and one of the handled playback events
//! 3. `Metadata.type` present and `movie` or `episode`
//! 4. player locality (when only local players are allowed)
//! 5. player uuid present and not excluded
//! 6. `Metadata.guid` present for play, resume and stop

use std::collections::HashSet;
use std::fmt;

use bytes::Bytes;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::artwork::cache::CacheKey;

/// Errors for notifications that cannot be classified at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("No event found in the payload")]
    MissingEventField,

    #[error("No media type found in the payload")]
    MissingMediaType,

    #[error("No media guid found in the payload")]
    MissingMediaGuid,
}

/// The two multipart fields of an inbound webhook, as received.
#[derive(Debug, Clone, Default)]
pub struct RawNotification {
    /// JSON notification document.
    pub payload: Option<String>,
    /// Attached artwork bytes.
    pub thumb: Option<Bytes>,
}

/// Handled playback events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Play,
    Pause,
    Resume,
    Stop,
}

impl EventKind {
    /// Maps a webhook event name (`media.play`, ...) to a handled kind.
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "media.play" => Some(Self::Play),
            "media.pause" => Some(Self::Pause),
            "media.resume" => Some(Self::Resume),
            "media.stop" => Some(Self::Stop),
            _ => None,
        }
    }

    /// Whether this event needs a media guid (and therefore a cache key).
    #[must_use]
    pub fn requires_guid(self) -> bool {
        !matches!(self, Self::Pause)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        };
        f.write_str(name)
    }
}

/// Media types the lights react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Movie,
    Episode,
}

impl MediaType {
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "movie" => Some(Self::Movie),
            "episode" => Some(Self::Episode),
            _ => None,
        }
    }
}

/// A classified, actionable notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaEvent {
    pub kind: EventKind,
    pub media_type: MediaType,
    /// Raw `Metadata.guid`. Always present unless `kind` is `Pause`.
    pub media_guid: Option<String>,
    /// Digest of `media_guid`. Present exactly when `media_guid` is.
    pub cache_key: Option<CacheKey>,
    pub player_uuid: String,
    /// `Player.local` when it was a boolean.
    pub player_is_local: Option<bool>,
    pub has_attached_image: bool,
}

/// Why a well-formed notification needs no action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnhandledEvent(String),
    UnsupportedMediaType(String),
    RemotePlayer,
    MissingPlayerUuid,
    ExcludedPlayer(String),
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnhandledEvent(name) => write!(f, "unhandled event {name}"),
            Self::UnsupportedMediaType(kind) => write!(f, "unsupported media type {kind}"),
            Self::RemotePlayer => write!(f, "player is not local"),
            Self::MissingPlayerUuid => write!(f, "no player uuid in the payload"),
            Self::ExcludedPlayer(uuid) => write!(f, "player {uuid} is excluded"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Action(MediaEvent),
    Ignored(IgnoreReason),
}

/// Which players may drive the lights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerFilter {
    pub excluded_player_uuids: HashSet<String>,
    pub local_players_only: bool,
}

impl PlayerFilter {
    pub fn new<I, S>(excluded_player_uuids: I, local_players_only: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded_player_uuids: excluded_player_uuids.into_iter().map(Into::into).collect(),
            local_players_only,
        }
    }
}

impl Default for PlayerFilter {
    fn default() -> Self {
        Self {
            excluded_player_uuids: HashSet::new(),
            local_players_only: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payload accessors
// ─────────────────────────────────────────────────────────────────────────────

fn section<'a>(doc: &'a Map<String, Value>, name: &str) -> Option<&'a Map<String, Value>> {
    doc.get(name).and_then(Value::as_object)
}

fn nested_str<'a>(doc: &'a Map<String, Value>, section_name: &str, key: &str) -> Option<&'a str> {
    section(doc, section_name)?.get(key)?.as_str()
}

/// `Player.uuid`, stringifying numbers and other scalars.
fn player_uuid(doc: &Map<String, Value>) -> Option<String> {
    match section(doc, "Player")?.get("uuid")? {
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        other => Some(other.to_string()),
    }
}

fn player_is_local(doc: &Map<String, Value>) -> Option<bool> {
    section(doc, "Player")?.get("local")?.as_bool()
}

/// Classifies a notification against the configured player filter.
pub fn classify(
    raw: &RawNotification,
    filter: &PlayerFilter,
) -> Result<Classification, ClassifyError> {
    let text = raw
        .payload
        .as_deref()
        .ok_or_else(|| ClassifyError::MalformedPayload("no payload field".to_string()))?;
    let doc: Value =
        serde_json::from_str(text).map_err(|e| ClassifyError::MalformedPayload(e.to_string()))?;
    let Value::Object(doc) = doc else {
        return Err(ClassifyError::MalformedPayload(
            "payload is not a JSON object".to_string(),
        ));
    };

    let event_name = doc
        .get("event")
        .and_then(Value::as_str)
        .ok_or(ClassifyError::MissingEventField)?;
    log::info!("[Router] Event: {}", event_name);

    let Some(kind) = EventKind::from_event_name(event_name) else {
        return Ok(Classification::Ignored(IgnoreReason::UnhandledEvent(
            event_name.to_string(),
        )));
    };

    let type_name =
        nested_str(&doc, "Metadata", "type").ok_or(ClassifyError::MissingMediaType)?;
    let Some(media_type) = MediaType::from_type_name(type_name) else {
        log::debug!("[Router] Media type {} is not movie or episode", type_name);
        return Ok(Classification::Ignored(
            IgnoreReason::UnsupportedMediaType(type_name.to_string()),
        ));
    };

    let is_local = player_is_local(&doc);
    if filter.local_players_only {
        match is_local {
            Some(false) => {
                log::info!("[Router] Player is not local, ignoring");
                return Ok(Classification::Ignored(IgnoreReason::RemotePlayer));
            }
            Some(true) => {}
            // Unknown locality is treated as local.
            None => log::info!("[Router] Could not tell whether the player is local; assuming it is"),
        }
    }

    let Some(uuid) = player_uuid(&doc) else {
        log::warn!("[Router] No player uuid found");
        return Ok(Classification::Ignored(IgnoreReason::MissingPlayerUuid));
    };
    if filter.excluded_player_uuids.contains(&uuid) {
        log::info!("[Router] Player {} is excluded from controlling the lights", uuid);
        return Ok(Classification::Ignored(IgnoreReason::ExcludedPlayer(uuid)));
    }

    let media_guid = nested_str(&doc, "Metadata", "guid").map(str::to_string);
    if kind.requires_guid() && media_guid.is_none() {
        return Err(ClassifyError::MissingMediaGuid);
    }
    let cache_key = media_guid.as_deref().map(CacheKey::from_guid);
    if let Some(key) = &cache_key {
        log::debug!("[Router] Cache key: {}", key);
    }

    Ok(Classification::Action(MediaEvent {
        kind,
        media_type,
        media_guid,
        cache_key,
        player_uuid: uuid,
        player_is_local: is_local,
        has_attached_image: raw.thumb.as_ref().is_some_and(|b| !b.is_empty()),
    }))
}
