use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mcb_telemetry::{LogEntry, LogFilter, LogLevel};
use serde::{Deserialize, Serialize};

use crate::http::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub level: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntry>,
}

/// `GET /logs`: buffered entries, oldest first.
pub async fn list_logs(State(state): State<AppState>, Query(query): Query<LogsQuery>) -> Response {
    let level = match query.level.as_deref().map(str::parse::<LogLevel>) {
        None => None,
        Some(Ok(level)) => Some(level),
        Some(Err(err)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": err })),
            )
                .into_response();
        }
    };
    let filter = LogFilter {
        level,
        limit: query.limit,
    };
    Json(LogsResponse {
        logs: state.logs.query(&filter),
    })
    .into_response()
}
