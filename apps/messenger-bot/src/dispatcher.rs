//! Turns inbound messaging events into at most one reply each.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use mcb_core::replies;
use mcb_core::{
    CargoRegistry, DeliveryStatus, GET_STARTED_PAYLOAD, KeywordConfig, MessagingEvent,
    OutboundMessage, SenderAction, SharedSender, SubscriptionRegistry,
};
use mcb_session::{ConversationState, SharedSessionStore};
use tracing::{Instrument, debug, error, info, info_span, warn};

/// What a single event asks for, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent<'a> {
    GetStarted,
    StartTracking,
    /// Free text received while the sender was asked for a tracking number.
    TrackingNumber(&'a str),
    Address,
    Contact,
    Origin,
    Info,
    /// Digits-only text looked up without a prompt.
    DirectLookup(&'a str),
    Fallback,
}

/// Classifies one event. `None` means the event gets no reply.
pub fn classify<'a>(
    event: &'a MessagingEvent,
    state: ConversationState,
    keywords: &KeywordConfig,
) -> Option<Intent<'a>> {
    if event.postback_payload() == Some(GET_STARTED_PAYLOAD) {
        return Some(Intent::GetStarted);
    }
    let text = event.text()?;

    if keywords.tracking.matches(text) {
        return Some(Intent::StartTracking);
    }
    if state == ConversationState::AwaitingTrackingNumber {
        return Some(Intent::TrackingNumber(text));
    }
    let intent = if keywords.address.matches(text) {
        Intent::Address
    } else if keywords.contact.matches(text) {
        Intent::Contact
    } else if keywords.origin.matches(text) {
        Intent::Origin
    } else if keywords.info.matches(text) {
        Intent::Info
    } else if text.bytes().all(|b| b.is_ascii_digit()) {
        Intent::DirectLookup(text)
    } else {
        Intent::Fallback
    };
    Some(intent)
}

/// Per-batch counters returned to the webhook for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub replied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Consumer of deduplicated webhook batches.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, events: Vec<MessagingEvent>) -> Result<DispatchSummary>;
}

pub type SharedEventHandler = Arc<dyn EventHandler>;

pub struct Dispatcher {
    sender: SharedSender,
    sessions: SharedSessionStore,
    cargo: Arc<CargoRegistry>,
    subscriptions: Arc<SubscriptionRegistry>,
    keywords: KeywordConfig,
    page_id: Option<String>,
    typing_indicator: bool,
}

impl Dispatcher {
    pub fn new(
        sender: SharedSender,
        sessions: SharedSessionStore,
        cargo: Arc<CargoRegistry>,
        subscriptions: Arc<SubscriptionRegistry>,
        keywords: KeywordConfig,
    ) -> Self {
        Self {
            sender,
            sessions,
            cargo,
            subscriptions,
            keywords,
            page_id: None,
            typing_indicator: false,
        }
    }

    pub fn with_page_id(mut self, page_id: Option<String>) -> Self {
        self.page_id = page_id;
        self
    }

    pub fn with_typing_indicator(mut self, enabled: bool) -> Self {
        self.typing_indicator = enabled;
        self
    }

    /// Handles one event; `Ok(false)` when nothing was sent.
    async fn handle_event(&self, event: &MessagingEvent) -> Result<bool> {
        let Some(sender_id) = event.sender_id() else {
            debug!("event without sender skipped");
            return Ok(false);
        };
        if event.is_echo() || self.page_id.as_deref() == Some(sender_id) {
            debug!(sender = %sender_id, "own message skipped");
            return Ok(false);
        }

        let state = self.sessions.get(sender_id).await?;
        let Some(intent) = classify(event, state, &self.keywords) else {
            debug!(sender = %sender_id, kind = event.kind().as_str(), "event has nothing to answer");
            return Ok(false);
        };
        info!(sender = %sender_id, intent = ?intent, "event classified");

        let reply = match intent {
            Intent::GetStarted => replies::WELCOME.to_string(),
            Intent::StartTracking => {
                self.sessions
                    .set(sender_id, ConversationState::AwaitingTrackingNumber)
                    .await?;
                replies::TRACKING_PROMPT.to_string()
            }
            Intent::TrackingNumber(text) => {
                self.sessions.clear(sender_id).await?;
                self.lookup(sender_id, text).await
            }
            Intent::Address => replies::ADDRESS.to_string(),
            Intent::Contact => replies::CONTACT.to_string(),
            Intent::Origin => replies::ORIGIN.to_string(),
            Intent::Info => replies::INFO.to_string(),
            Intent::DirectLookup(text) => self.lookup(sender_id, text).await,
            Intent::Fallback => replies::FALLBACK.to_string(),
        };

        if self.typing_indicator {
            self.sender
                .send(OutboundMessage::action(sender_id, SenderAction::TypingOn))
                .await;
        }
        if let DeliveryStatus::Failed { reason } = self
            .sender
            .send(OutboundMessage::reply(sender_id, reply))
            .await
        {
            warn!(sender = %sender_id, reason = %reason, "reply not delivered");
        }
        Ok(true)
    }

    async fn lookup(&self, sender_id: &str, goods_id: &str) -> String {
        match self.cargo.find(goods_id).await {
            Some(record) => {
                if self.subscriptions.subscribe(&record.goods_id, sender_id) {
                    info!(sender = %sender_id, goods_id = %record.goods_id, "subscribed to shipment updates");
                }
                replies::shipment_details(&record)
            }
            None => {
                info!(sender = %sender_id, goods_id = %goods_id, "shipment not found");
                replies::NOT_FOUND.to_string()
            }
        }
    }
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn handle(&self, events: Vec<MessagingEvent>) -> Result<DispatchSummary> {
        let mut summary = DispatchSummary::default();
        for event in &events {
            let span = info_span!(
                "messenger_event",
                sender = event.sender_id().unwrap_or_default(),
                kind = event.kind().as_str()
            );
            match self.handle_event(event).instrument(span).await {
                Ok(true) => summary.replied += 1,
                Ok(false) => summary.skipped += 1,
                Err(err) => {
                    summary.failed += 1;
                    error!(
                        sender = event.sender_id().unwrap_or_default(),
                        error = %err,
                        "failed to process messaging event"
                    );
                }
            }
        }
        Ok(summary)
    }
}
