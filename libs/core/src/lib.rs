//! Core contracts and value types for the Messenger cargo bot.
//!
//! This crate holds the webhook payload model, the in-memory shipment and
//! subscription registries, the keyword tables and reply texts, and the
//! Graph Send API client used for every outbound message.
pub mod cargo;
pub mod keywords;
pub mod messenger;
pub mod replies;
pub mod subscriptions;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
pub mod types;

pub use cargo::*;
pub use keywords::*;
pub use messenger::*;
pub use subscriptions::*;
pub use types::*;
