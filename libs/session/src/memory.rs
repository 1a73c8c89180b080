use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::{ConversationState, SessionStore};

/// Only non-idle senders are stored; a missing entry reads as `Idle`.
#[derive(Default)]
pub struct MemorySessionStore {
    by_sender: DashMap<String, ConversationState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            by_sender: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sender.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, sender_id: &str) -> Result<ConversationState> {
        Ok(self
            .by_sender
            .get(sender_id)
            .map(|entry| *entry.value())
            .unwrap_or_default())
    }

    async fn set(&self, sender_id: &str, state: ConversationState) -> Result<()> {
        if state == ConversationState::Idle {
            self.by_sender.remove(sender_id);
        } else {
            self.by_sender.insert(sender_id.to_string(), state);
        }
        Ok(())
    }

    async fn clear(&self, sender_id: &str) -> Result<()> {
        self.by_sender.remove(sender_id);
        Ok(())
    }
}
