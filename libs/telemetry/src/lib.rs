//! Telemetry for the cargo bot.
//!
//! `install` wires a `tracing` subscriber that prints to stdout, feeds the
//! in-process [`LogStore`] served at `/logs`, and optionally exports spans
//! and metrics over OTLP.

mod capture;
mod config;
mod log_store;
mod tracing_init;

use anyhow::Result;

pub use capture::LogCaptureLayer;
pub use config::{TelemetryConfig, TelemetryProtocol};
pub use log_store::{DEFAULT_LOG_CAPACITY, LogEntry, LogFilter, LogLevel, LogStore};
pub use tracing_init::init_telemetry;

/// Installs the shared subscriber configured from the environment and
/// `RUST_LOG`, capturing events into `store`.
pub fn install(service_name: &str, store: &LogStore) -> Result<()> {
    let cfg = TelemetryConfig::from_env(service_name, env!("CARGO_PKG_VERSION"));
    init_telemetry(cfg, store.clone())
}
