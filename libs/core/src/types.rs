use serde::{Deserialize, Serialize};

/// Postback payload configured on the Messenger "Get Started" button.
pub const GET_STARTED_PAYLOAD: &str = "GET_STARTED";

/// Top-level body Facebook posts to the webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl WebhookPayload {
    /// Discriminator for Page subscriptions; anything else is rejected.
    pub const PAGE_OBJECT: &'static str = "page";

    pub fn is_page(&self) -> bool {
        self.object == Self::PAGE_OBJECT
    }

    /// All messaging events across every entry, in delivery order.
    pub fn into_events(self) -> Vec<MessagingEvent> {
        self.entry
            .into_iter()
            .flat_map(|entry| entry.messaging)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default)]
    pub messaging: Vec<MessagingEvent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_echo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// One item of `entry[].messaging[]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagingEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<InboundMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<Postback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Postback,
    Message,
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Postback => "postback",
            EventKind::Message => "message",
            EventKind::Other => "other",
        }
    }
}

impl MessagingEvent {
    pub fn sender_id(&self) -> Option<&str> {
        self.sender
            .as_ref()
            .map(|p| p.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn kind(&self) -> EventKind {
        if self.postback.is_some() {
            EventKind::Postback
        } else if self.message.is_some() {
            EventKind::Message
        } else {
            EventKind::Other
        }
    }

    /// Message text with surrounding whitespace removed; `None` when blank.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|m| m.text.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn postback_payload(&self) -> Option<&str> {
        self.postback.as_ref().and_then(|p| p.payload.as_deref())
    }

    pub fn is_echo(&self) -> bool {
        self.message.as_ref().is_some_and(|m| m.is_echo)
    }

    /// Best-effort identity used for deduplication.
    ///
    /// Prefers the platform message id. Without one it falls back to
    /// `sender:kind:marker:timestamp`, where the marker is the postback
    /// payload or the message text; identical actions from the same sender
    /// within one timestamp tick collide.
    pub fn fingerprint(&self) -> String {
        let mid = self
            .message
            .as_ref()
            .and_then(|m| m.mid.as_deref())
            .or_else(|| self.postback.as_ref().and_then(|p| p.mid.as_deref()))
            .filter(|mid| !mid.is_empty());
        if let Some(mid) = mid {
            return mid.to_string();
        }

        let kind = self.kind();
        let marker = match kind {
            EventKind::Postback => self.postback_payload().unwrap_or_default(),
            EventKind::Message => self
                .message
                .as_ref()
                .and_then(|m| m.text.as_deref())
                .unwrap_or_default(),
            EventKind::Other => "",
        };
        format!(
            "{}:{}:{}:{}",
            self.sender_id().unwrap_or_default(),
            kind.as_str(),
            marker,
            self.timestamp.unwrap_or_default()
        )
    }
}
