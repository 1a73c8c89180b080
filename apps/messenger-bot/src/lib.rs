//! Maral Cargo Messenger bot.
//!
//! Receives Facebook Page webhooks, answers keyword and tracking-number
//! messages, and lets operators move shipments while notifying everyone
//! who looked them up.

pub mod admin;
pub mod config;
pub mod dispatcher;
pub mod http;
pub mod logs;
pub mod reqid;
pub mod webhook;

pub use config::BotConfig;
pub use dispatcher::{DispatchSummary, Dispatcher, EventHandler, Intent, SharedEventHandler};
pub use http::{AppState, build_router};
