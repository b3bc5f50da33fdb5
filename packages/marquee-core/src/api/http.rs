//! HTTP route handlers.
//!
//! All handlers are thin; the webhook handler only reads the multipart form
//! and hands it to the pipeline.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::api::AppState;
use crate::error::{MarqueeError, MarqueeResult};
use crate::protocol_constants::{
    ACK_BODY, MAX_WEBHOOK_BODY_SIZE, PAYLOAD_FIELD, SERVICE_ID, THUMB_FIELD,
};
use crate::services::RawNotification;

/// Creates the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(handle_webhook))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BODY_SIZE))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Liveness check.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_ID,
    }))
}

/// Receives a media server webhook.
///
/// Returns `ok` for every notification that could be classified, whether or
/// not the lights changed. Notifications that cannot be classified get a
/// 400 JSON error.
async fn handle_webhook(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> MarqueeResult<&'static str> {
    let multipart = multipart.map_err(|e| {
        log::warn!("[Webhook] Rejected non-multipart request: {}", e);
        MarqueeError::MalformedPayload(e.to_string())
    })?;
    let raw = read_notification(multipart).await?;

    state.pipeline.handle(raw).await?;
    Ok(ACK_BODY)
}

async fn read_notification(mut multipart: Multipart) -> MarqueeResult<RawNotification> {
    let malformed = |e: axum::extract::multipart::MultipartError| {
        log::warn!("[Webhook] Failed to read multipart body: {}", e);
        MarqueeError::MalformedPayload(e.body_text())
    };

    let mut raw = RawNotification::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(PAYLOAD_FIELD) => raw.payload = Some(field.text().await.map_err(malformed)?),
            Some(THUMB_FIELD) => raw.thumb = Some(field.bytes().await.map_err(malformed)?),
            other => log::debug!("[Webhook] Skipping form field {:?}", other),
        }
    }

    log::debug!(
        "[Webhook] Received payload={} thumb={} bytes",
        raw.payload.is_some(),
        raw.thumb.as_ref().map_or(0, |b| b.len())
    );
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::artwork::cache::ThumbnailCache;
    use crate::artwork::palette::ColorThiefExtractor;
    use crate::lifx::test_fixtures::RecordingLights;
    use crate::lifx::LightGrouping;
    use crate::services::{
        LightDispatcher, LightingPlan, PlaybackPipeline, PlayerFilter, SceneIds,
    };

    const BOUNDARY: &str = "marquee-test-boundary";

    async fn app() -> (TempDir, Arc<RecordingLights>, Router) {
        let dir = TempDir::new().unwrap();
        let cache = ThumbnailCache::open(dir.path()).await.unwrap();
        let lights = Arc::new(RecordingLights::new());
        let plan = LightingPlan {
            grouping: LightGrouping::partition(&["label:Lamp".to_string()], 1),
            scenes: SceneIds {
                pause: "pause-uuid".into(),
                play: "play-uuid".into(),
            },
            color_count: 1,
            quality: 1,
            brightness: 0.35,
            duration: 2.0,
        };
        let pipeline = PlaybackPipeline::new(
            PlayerFilter::default(),
            cache,
            Arc::new(ColorThiefExtractor),
            LightDispatcher::new(lights.clone()),
            plan,
        );
        let state = AppState {
            pipeline: Arc::new(pipeline),
        };
        (dir, lights, create_router(state))
    }

    fn form(payload: Option<&str>) -> Request<Body> {
        let mut body = String::new();
        if let Some(payload) = payload {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"payload\"\r\n\r\n{payload}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nignored\r\n"
        ));
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::post("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(res: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn error_code(res: axum::response::Response) -> String {
        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(json["status"], 400);
        json["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_service() {
        let (_dir, _, app) = app().await;
        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "marquee");
    }

    #[tokio::test]
    async fn unhandled_event_is_acknowledged() {
        let (_dir, lights, app) = app().await;
        let res = app
            .oneshot(form(Some(r#"{"event":"media.scrobble"}"#)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ok");
        assert!(lights.calls().is_empty());
    }

    #[tokio::test]
    async fn pause_activates_scene_and_acknowledges() {
        let (_dir, lights, app) = app().await;
        let payload = r#"{"event":"media.pause","Metadata":{"type":"episode"},"Player":{"local":true,"uuid":"p"}}"#;
        let res = app.oneshot(form(Some(payload))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(lights.activated_scenes(), vec!["pause-uuid"]);
    }

    #[tokio::test]
    async fn play_without_player_uuid_is_acknowledged() {
        let (_dir, lights, app) = app().await;
        let payload = r#"{"event":"media.play","Metadata":{"type":"movie","guid":"g"},"Player":{"local":true}}"#;
        let res = app.oneshot(form(Some(payload))).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "ok");
        assert!(lights.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_payload_is_a_bad_request() {
        let (_dir, _, app) = app().await;
        let res = app.oneshot(form(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(res).await, "malformed_payload");
    }

    #[tokio::test]
    async fn non_multipart_body_is_a_bad_request() {
        let (_dir, _, app) = app().await;
        let req = Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(res).await, "malformed_payload");
    }

    #[tokio::test]
    async fn play_without_guid_is_a_bad_request() {
        let (_dir, lights, app) = app().await;
        let payload = r#"{"event":"media.play","Metadata":{"type":"movie"},"Player":{"uuid":"p"}}"#;
        let res = app.oneshot(form(Some(payload))).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error_code(res).await, "missing_media_guid");
        assert!(lights.calls().is_empty());
    }
}
