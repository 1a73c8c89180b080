//! Facebook webhook: subscription handshake and event intake.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mcb_core::WebhookPayload;
use mcb_idempotency::IdKey;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::http::AppState;

pub const EVENT_RECEIVED: &str = "EVENT_RECEIVED";

#[derive(Debug, Default, Deserialize)]
pub struct VerifyQs {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub token: Option<String>,
}

pub async fn verify(State(state): State<AppState>, Query(q): Query<VerifyQs>) -> impl IntoResponse {
    if q.mode.as_deref() == Some("subscribe")
        && q.token.as_deref() == Some(state.verify_token.as_ref())
    {
        info!("webhook verified");
        (StatusCode::OK, q.challenge.unwrap_or_default())
    } else {
        warn!(mode = ?q.mode, "webhook verification rejected");
        (StatusCode::FORBIDDEN, "forbidden".to_string())
    }
}

pub async fn receive(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to decode webhook payload");
            return StatusCode::NOT_FOUND.into_response();
        }
    };
    if !payload.is_page() {
        warn!(object = %payload.object, "webhook payload is not a page subscription");
        return StatusCode::NOT_FOUND.into_response();
    }

    let events = payload.into_events();
    metrics::counter!("webhook_events_total").increment(events.len() as u64);

    let mut fresh = Vec::with_capacity(events.len());
    let mut claimed = Vec::with_capacity(events.len());
    for event in events {
        let key = IdKey::new(event.fingerprint());
        match state.guard.should_process(&key).await {
            Ok(true) => {
                fresh.push(event);
                claimed.push(key);
            }
            Ok(false) => {}
            Err(err) => {
                error!(error = %err, event_id = %key, "dedup check failed; processing anyway");
                fresh.push(event);
            }
        }
    }

    if fresh.is_empty() {
        return (StatusCode::OK, EVENT_RECEIVED).into_response();
    }

    match state.handler.handle(fresh).await {
        Ok(summary) => {
            info!(
                replied = summary.replied,
                skipped = summary.skipped,
                failed = summary.failed,
                "webhook batch processed"
            );
            (StatusCode::OK, EVENT_RECEIVED).into_response()
        }
        Err(err) => {
            error!(error = %err, "webhook batch failed");
            // the platform retries on 500; let that redelivery through
            state.guard.release(&claimed).await;
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal server error" })),
            )
                .into_response()
        }
    }
}
