//! Application services layer.
//!
//! This module contains the per-notification logic that sits between the
//! HTTP layer and the infrastructure (artwork/, lifx/).

pub mod event_router;
pub mod light_dispatcher;
pub mod playback_pipeline;

pub use event_router::{
    classify, Classification, ClassifyError, EventKind, IgnoreReason, MediaEvent, MediaType,
    PlayerFilter, RawNotification,
};
pub use light_dispatcher::{DispatchReport, LightDispatcher};
pub use playback_pipeline::{LightingPlan, Outcome, PlaybackPipeline, SceneIds};
