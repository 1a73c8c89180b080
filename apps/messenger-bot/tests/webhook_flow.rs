mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;
use common::*;
use mcb_bot::{DispatchSummary, EventHandler};
use mcb_core::{MessagingEvent, replies};
use serde_json::json;

#[tokio::test]
async fn verification_echoes_challenge() {
    let h = harness();
    let (status, body) = call(
        &h.router,
        get("/webhook?hub.mode=subscribe&hub.verify_token=verify-me&hub.challenge=abc123"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"abc123");
}

#[tokio::test]
async fn verification_rejects_wrong_token_or_mode() {
    let h = harness();
    for uri in [
        "/webhook?hub.mode=subscribe&hub.verify_token=nope&hub.challenge=abc",
        "/webhook?hub.mode=unsubscribe&hub.verify_token=verify-me&hub.challenge=abc",
        "/webhook?hub.challenge=abc",
    ] {
        let (status, _) = call(&h.router, get(uri)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn tracking_conversation_end_to_end() {
    let h = harness();
    let (status, body) = call(
        &h.router,
        post_json(
            "/webhook",
            &page_payload(vec![text_event("psid-1", "m-1", "бараа шалгах")]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"EVENT_RECEIVED");

    let (status, _) = call(
        &h.router,
        post_json(
            "/webhook",
            &page_payload(vec![text_event("psid-1", "m-2", "12345")]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let texts = h.sender.texts_to("psid-1");
    assert_eq!(texts.len(), 2);
    assert_eq!(texts[0], replies::TRACKING_PROMPT);
    for part in ["12345", "Эрээн агуулах", "Ачигдсан", "2024-07-05"] {
        assert!(texts[1].contains(part), "missing {part}");
    }
    assert_eq!(h.state.subscriptions.subscribers("12345"), vec!["psid-1"]);

    // the awaiting flag is gone, so a non-numeric text falls through
    call(
        &h.router,
        post_json(
            "/webhook",
            &page_payload(vec![text_event("psid-1", "m-3", "сайн уу")]),
        ),
    )
    .await;
    assert_eq!(h.sender.texts_to("psid-1")[2], replies::FALLBACK);
}

#[tokio::test]
async fn numeric_text_is_looked_up_without_prompt() {
    let h = harness();
    call(
        &h.router,
        post_json(
            "/webhook",
            &page_payload(vec![text_event("psid-7", "m-1", "99999")]),
        ),
    )
    .await;
    assert_eq!(h.sender.texts_to("psid-7"), vec![replies::NOT_FOUND.to_string()]);
    assert!(h.state.subscriptions.subscribers("99999").is_empty());
}

#[tokio::test]
async fn redelivered_event_is_answered_once() {
    let h = harness();
    let payload = page_payload(vec![text_event("psid-1", "m-dup", "хаяг")]);
    for _ in 0..2 {
        let (status, body) = call(&h.router, post_json("/webhook", &payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&body[..], b"EVENT_RECEIVED");
    }
    assert_eq!(h.sender.texts_to("psid-1"), vec![replies::ADDRESS.to_string()]);
}

#[tokio::test]
async fn events_without_mid_dedupe_on_fingerprint() {
    let h = harness();
    let payload = page_payload(vec![postback_event("psid-3", "GET_STARTED")]);
    call(&h.router, post_json("/webhook", &payload)).await;
    call(&h.router, post_json("/webhook", &payload)).await;
    assert_eq!(h.sender.texts_to("psid-3"), vec![replies::WELCOME.to_string()]);
}

#[tokio::test]
async fn batch_is_processed_in_order() {
    let h = harness();
    call(
        &h.router,
        post_json(
            "/webhook",
            &page_payload(vec![
                text_event("psid-1", "m-1", "бараа"),
                text_event("psid-1", "m-2", "34567"),
                text_event("psid-1", "m-3", "утас"),
            ]),
        ),
    )
    .await;
    let texts = h.sender.texts_to("psid-1");
    assert_eq!(texts.len(), 3);
    assert_eq!(texts[0], replies::TRACKING_PROMPT);
    assert!(texts[1].contains("Улаанбаатар"));
    assert_eq!(texts[2], replies::CONTACT);
}

#[tokio::test]
async fn non_page_or_invalid_payload_is_not_found() {
    let h = harness();
    let (status, _) = call(
        &h.router,
        post_json("/webhook", &json!({"object": "instagram", "entry": []})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&h.router, post_raw("/webhook", "{not json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(h.sender.sent().is_empty());
}

#[tokio::test]
async fn empty_page_batch_is_acknowledged() {
    let h = harness();
    let (status, body) = call(&h.router, post_json("/webhook", &page_payload(vec![]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"EVENT_RECEIVED");
}

#[derive(Default)]
struct ExplodingHandler {
    calls: AtomicUsize,
}

#[async_trait]
impl EventHandler for ExplodingHandler {
    async fn handle(&self, _events: Vec<MessagingEvent>) -> anyhow::Result<DispatchSummary> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("dispatcher crashed")
    }
}

#[tokio::test]
async fn dispatcher_failure_returns_500() {
    let h = harness_with(|state| state.with_handler(Arc::new(ExplodingHandler::default())));
    let (status, body) = call(
        &h.router,
        post_json(
            "/webhook",
            &page_payload(vec![text_event("psid-1", "m-1", "хаяг")]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body), json!({"error": "Internal server error"}));
}

#[tokio::test]
async fn failed_batch_is_retried_on_redelivery() {
    let handler = Arc::new(ExplodingHandler::default());
    let shared = handler.clone();
    let h = harness_with(move |state| state.with_handler(shared));
    let payload = page_payload(vec![text_event("psid-1", "m-retry", "хаяг")]);

    for _ in 0..2 {
        let (status, _) = call(&h.router, post_json("/webhook", &payload)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert_eq!(handler.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn responses_carry_request_id() {
    use tower::ServiceExt;
    let h = harness();
    let response = h.router.clone().oneshot(get("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let rid = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(rid.len(), 36);
}

struct UnavailableIdemStore;

#[async_trait]
impl mcb_idempotency::IdemStore for UnavailableIdemStore {
    async fn put_if_absent(&self, _key: &str, _ttl_s: u64) -> anyhow::Result<bool> {
        anyhow::bail!("dedup store unavailable")
    }

    async fn purge_expired(&self, _now: time::OffsetDateTime) -> usize {
        0
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("dedup store unavailable")
    }
}

#[tokio::test]
async fn dedup_store_failure_still_processes_events() {
    let h = harness_with(|mut state| {
        state.guard = mcb_idempotency::IdempotencyGuard::new(Arc::new(UnavailableIdemStore), 300);
        state
    });
    let payload = page_payload(vec![text_event("psid-1", "m-1", "хаяг")]);
    let (status, _) = call(&h.router, post_json("/webhook", &payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.sender.texts_to("psid-1"), vec![replies::ADDRESS.to_string()]);
}
