//! Test doubles for the outbound sender.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::messenger::{DeliveryStatus, OutboundMessage, OutboundSender};

/// Records every outbound message and reports it as sent.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// `(recipient, text)` for every text message, in send order.
    pub fn texts(&self) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter_map(|m| {
                let text = m.text_body()?.to_string();
                Some((m.recipient.id, text))
            })
            .collect()
    }

    pub fn texts_to(&self, recipient: &str) -> Vec<String> {
        self.texts()
            .into_iter()
            .filter(|(to, _)| to == recipient)
            .map(|(_, text)| text)
            .collect()
    }

    pub fn clear(&self) {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[async_trait]
impl OutboundSender for RecordingSender {
    async fn send(&self, message: OutboundMessage) -> DeliveryStatus {
        let id = format!("rec:{}", message.recipient_id());
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message);
        DeliveryStatus::Sent {
            message_id: Some(id),
        }
    }
}

/// Rejects every message, as the Graph API does for a revoked token, and
/// counts how many sends were attempted.
#[derive(Debug, Default)]
pub struct FailingSender {
    attempts: AtomicUsize,
}

impl FailingSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutboundSender for FailingSender {
    async fn send(&self, _message: OutboundMessage) -> DeliveryStatus {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        DeliveryStatus::Failed {
            reason: "graph returned 401 Unauthorized".into(),
        }
    }
}
