mod memory;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::MemorySessionStore;

/// Shared session store handle used across services.
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Where a sender currently is in the conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    #[default]
    Idle,
    /// The bot asked for a tracking number; the next free text is a lookup key.
    AwaitingTrackingNumber,
}

/// Conversation state keyed by the Messenger page-scoped sender id.
///
/// States never expire: a sender stays in `AwaitingTrackingNumber` until
/// their next text message arrives.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, sender_id: &str) -> Result<ConversationState>;
    async fn set(&self, sender_id: &str, state: ConversationState) -> Result<()>;
    async fn clear(&self, sender_id: &str) -> Result<()>;
}

/// Returns an in-memory session store wrapped in an [`Arc`].
pub fn shared_memory_store() -> SharedSessionStore {
    Arc::new(MemorySessionStore::new())
}
