//! Centralized error types for the Marquee core library.
//!
//! This module provides a unified error handling system that:
//! - Defines structured error types using `thiserror`
//! - Maps errors to appropriate HTTP status codes
//! - Implements `IntoResponse` for automatic JSON error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::artwork::cache::CacheError;
use crate::artwork::palette::PaletteError;
use crate::lifx::client::LightingError;
use crate::services::event_router::ClassifyError;

/// Trait for error types that provide machine-readable error codes.
///
/// Implement this trait to provide consistent error codes across different
/// error conversion paths.
pub trait ErrorCode {
    /// Returns a machine-readable error code for API responses.
    fn code(&self) -> &'static str;
}

impl ErrorCode for ClassifyError {
    fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::MissingEventField => "missing_event_field",
            Self::MissingMediaType => "missing_media_type",
            Self::MissingMediaGuid => "missing_media_guid",
        }
    }
}

impl ErrorCode for CacheError {
    fn code(&self) -> &'static str {
        "cache_io_failure"
    }
}

impl ErrorCode for PaletteError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnreadableImage { .. } => "unreadable_image",
            Self::Quantize(_) | Self::Worker(_) => "palette_failed",
        }
    }
}

impl ErrorCode for LightingError {
    fn code(&self) -> &'static str {
        match self {
            Self::Http(_) => "http_request_failed",
            Self::HttpStatus(_, _) => "lighting_error_status",
        }
    }
}

/// Application-wide error type for the Marquee server.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum MarqueeError {
    /// The notification had no parseable `payload` document.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// The notification document has no `event` field.
    #[error("No event found in the payload")]
    MissingEventField,

    /// The notification document has no `Metadata.type` field.
    #[error("No media type found in the payload")]
    MissingMediaType,

    /// A play, resume or stop notification has no `Metadata.guid` field.
    #[error("No media guid found in the payload")]
    MissingMediaGuid,

    /// Artwork could not be decoded as an image.
    #[error("Unreadable image: {0}")]
    UnreadableImage(String),

    /// The artwork decoded but no palette came out of it.
    #[error("Palette extraction failed: {0}")]
    PaletteFailed(String),

    /// A call to the lighting service failed.
    #[error("Lighting service failure: {0}")]
    LightingService(String),

    /// Reading or writing the artwork cache failed.
    #[error("Cache I/O failure: {0}")]
    CacheIo(String),

    /// Server configuration error (missing or invalid settings).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MarqueeError {
    /// Returns a machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedPayload(_) => "malformed_payload",
            Self::MissingEventField => "missing_event_field",
            Self::MissingMediaType => "missing_media_type",
            Self::MissingMediaGuid => "missing_media_guid",
            Self::UnreadableImage(_) => "unreadable_image",
            Self::PaletteFailed(_) => "palette_failed",
            Self::LightingService(_) => "lighting_service_failure",
            Self::CacheIo(_) => "cache_io_failure",
            Self::Configuration(_) => "configuration_error",
        }
    }

    /// Maps the error to an appropriate HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedPayload(_)
            | Self::MissingEventField
            | Self::MissingMediaType
            | Self::MissingMediaGuid => StatusCode::BAD_REQUEST,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::LightingService(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convenient Result alias for application-wide operations.
pub type MarqueeResult<T> = Result<T, MarqueeError>;

/// JSON response body for error responses.
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for MarqueeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: self.code(),
            message: self.to_string(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ClassifyError> for MarqueeError {
    fn from(err: ClassifyError) -> Self {
        match err {
            ClassifyError::MalformedPayload(msg) => Self::MalformedPayload(msg),
            ClassifyError::MissingEventField => Self::MissingEventField,
            ClassifyError::MissingMediaType => Self::MissingMediaType,
            ClassifyError::MissingMediaGuid => Self::MissingMediaGuid,
        }
    }
}

impl From<CacheError> for MarqueeError {
    fn from(err: CacheError) -> Self {
        Self::CacheIo(err.to_string())
    }
}

impl From<PaletteError> for MarqueeError {
    fn from(err: PaletteError) -> Self {
        match err {
            PaletteError::UnreadableImage { .. } => Self::UnreadableImage(err.to_string()),
            PaletteError::Quantize(_) | PaletteError::Worker(_) => {
                Self::PaletteFailed(err.to_string())
            }
        }
    }
}

impl From<LightingError> for MarqueeError {
    fn from(err: LightingError) -> Self {
        Self::LightingService(err.to_string())
    }
}
