use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, http::StatusCode, middleware, response::IntoResponse, routing::get};
use mcb_core::{CargoRegistry, KeywordConfig, SharedSender, SubscriptionRegistry};
use mcb_idempotency::IdempotencyGuard;
use mcb_session::shared_memory_store;
use mcb_telemetry::LogStore;
use tracing::info;

use crate::config::BotConfig;
use crate::dispatcher::{Dispatcher, SharedEventHandler};
use crate::{admin, logs, reqid, webhook};

/// Everything the handlers share. All stores live for the process.
#[derive(Clone)]
pub struct AppState {
    pub verify_token: Arc<str>,
    pub guard: IdempotencyGuard,
    pub handler: SharedEventHandler,
    pub cargo: Arc<CargoRegistry>,
    pub subscriptions: Arc<SubscriptionRegistry>,
    pub sender: SharedSender,
    pub logs: LogStore,
}

impl AppState {
    /// Loads keyword and seed overrides and wires the dispatcher.
    pub fn from_config(config: &BotConfig, sender: SharedSender, logs: LogStore) -> Result<Self> {
        let keywords = match &config.keywords_file {
            Some(path) => {
                let keywords = KeywordConfig::from_json_file(path)?;
                info!(path = %path.display(), "keyword overrides loaded");
                keywords
            }
            None => KeywordConfig::default(),
        };
        let cargo = match &config.cargo_seed_file {
            Some(path) => CargoRegistry::from_seed_file(path)
                .with_context(|| format!("loading cargo seed {}", path.display()))?,
            None => CargoRegistry::default(),
        };
        let cargo = Arc::new(cargo);
        let subscriptions = Arc::new(SubscriptionRegistry::new());

        let dispatcher = Dispatcher::new(
            sender.clone(),
            shared_memory_store(),
            cargo.clone(),
            subscriptions.clone(),
            keywords,
        )
        .with_page_id(config.page_id.clone())
        .with_typing_indicator(config.typing_indicator);

        Ok(Self {
            verify_token: Arc::from(config.verify_token.as_str()),
            guard: IdempotencyGuard::in_memory(config.dedup.ttl_secs),
            handler: Arc::new(dispatcher),
            cargo,
            subscriptions,
            sender,
            logs,
        })
    }

    pub fn with_handler(mut self, handler: SharedEventHandler) -> Self {
        self.handler = handler;
        self
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(webhook::verify).post(webhook::receive))
        .route(
            "/admin/products",
            get(admin::list_products).post(admin::update_product),
        )
        .route("/logs", get(logs::list_logs))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn(reqid::with_request_id))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}
