use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::serve;
use mcb_bot::{AppState, BotConfig, build_router};
use mcb_core::{GET_STARTED_PAYLOAD, GraphSender};
use mcb_idempotency::spawn_sweeper;
use mcb_telemetry::{LogStore, install as init_telemetry};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let logs = LogStore::new();
    init_telemetry("messenger-bot", &logs)?;

    let config = BotConfig::from_env()?;
    info!(config = ?config, "configuration loaded");

    let graph = GraphSender::new(
        reqwest::Client::new(),
        Some(config.graph_base.clone()),
        Some(config.graph_version.clone()),
        config.access_token.clone(),
    );
    if config.setup_profile {
        if let Err(err) = graph.ensure_get_started(GET_STARTED_PAYLOAD).await {
            warn!(error = %err, "failed to configure get started button");
        }
    }

    let state = AppState::from_config(&config, Arc::new(graph), logs)?;
    let sweeper = spawn_sweeper(
        state.guard.store(),
        Duration::from_secs(config.dedup.sweep_interval_secs),
    );
    let router = build_router(state);

    let listener = TcpListener::bind(config.addr).await?;
    info!("messenger-bot listening on {}", config.addr);
    serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    sweeper.abort();
    Ok(())
}
