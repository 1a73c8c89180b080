#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Request, StatusCode},
};
use mcb_bot::{AppState, BotConfig, build_router};
use mcb_core::testkit::RecordingSender;
use mcb_telemetry::LogStore;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const BODY_LIMIT: usize = 1024 * 1024;
pub const VERIFY_TOKEN: &str = "verify-me";

pub struct Harness {
    pub router: Router,
    pub sender: Arc<RecordingSender>,
    pub state: AppState,
}

pub fn harness() -> Harness {
    harness_with(|state| state)
}

pub fn harness_with(customize: impl FnOnce(AppState) -> AppState) -> Harness {
    let sender = Arc::new(RecordingSender::new());
    let state = AppState::from_config(
        &BotConfig::new(VERIFY_TOKEN, "page-token"),
        sender.clone(),
        LogStore::new(),
    )
    .unwrap();
    let state = customize(state);
    Harness {
        router: build_router(state.clone()),
        sender,
        state,
    }
}

pub async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Bytes) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

pub fn post_raw(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn page_payload(events: Vec<Value>) -> Value {
    json!({
        "object": "page",
        "entry": [{"id": "page-1", "time": 1_700_000_000_000_i64, "messaging": events}]
    })
}

pub fn text_event(sender: &str, mid: &str, text: &str) -> Value {
    json!({
        "sender": {"id": sender},
        "recipient": {"id": "page-1"},
        "timestamp": 1_700_000_000_000_i64,
        "message": {"mid": mid, "text": text}
    })
}

pub fn postback_event(sender: &str, payload: &str) -> Value {
    json!({
        "sender": {"id": sender},
        "recipient": {"id": "page-1"},
        "timestamp": 1_700_000_000_000_i64,
        "postback": {"title": "Get Started", "payload": payload}
    })
}

pub fn json_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap()
}
