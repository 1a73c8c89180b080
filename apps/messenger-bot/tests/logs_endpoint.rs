mod common;

use axum::http::StatusCode;
use common::*;
use mcb_telemetry::LogLevel;
use serde_json::json;

#[tokio::test]
async fn returns_buffer_oldest_first() {
    let h = harness();
    h.state.logs.append(LogLevel::Info, "first", json!({"n": 1}));
    h.state.logs.append(LogLevel::Warn, "second", json!({}));
    h.state.logs.append(LogLevel::Error, "third", json!(null));

    let (status, body) = call(&h.router, get("/logs")).await;
    assert_eq!(status, StatusCode::OK);
    let logs = json_body(&body)["logs"].as_array().unwrap().clone();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0]["message"], "first");
    assert_eq!(logs[0]["level"], "INFO");
    assert_eq!(logs[0]["data"]["n"], 1);
    assert_eq!(logs[2]["message"], "third");
    assert!(logs[0]["timestamp"].is_string());
}

#[tokio::test]
async fn level_and_limit_filter_the_view() {
    let h = harness();
    for i in 0..5 {
        h.state.logs.append(LogLevel::Warn, format!("warn {i}"), json!({}));
        h.state.logs.append(LogLevel::Info, format!("info {i}"), json!({}));
    }

    let (status, body) = call(&h.router, get("/logs?level=WARN&limit=2")).await;
    assert_eq!(status, StatusCode::OK);
    let messages: Vec<String> = json_body(&body)["logs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages, vec!["warn 3", "warn 4"]);
    assert_eq!(h.state.logs.len(), 10);

    let (status, _) = call(&h.router, get("/logs?level=LOUD")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
