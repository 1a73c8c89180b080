use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessagingType {
    /// Reply to a message the user just sent.
    Response,
    /// Proactive update outside a direct reply.
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderAction {
    TypingOn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundText {
    pub text: String,
}

/// Body of `POST /me/messages`: either a text message or a sender action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub recipient: Recipient,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_type: Option<MessagingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<OutboundText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_action: Option<SenderAction>,
}

impl OutboundMessage {
    pub fn reply(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::text(recipient_id, text, MessagingType::Response)
    }

    pub fn update(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::text(recipient_id, text, MessagingType::Update)
    }

    pub fn action(recipient_id: impl Into<String>, action: SenderAction) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.into(),
            },
            messaging_type: None,
            message: None,
            sender_action: Some(action),
        }
    }

    fn text(
        recipient_id: impl Into<String>,
        text: impl Into<String>,
        messaging_type: MessagingType,
    ) -> Self {
        Self {
            recipient: Recipient {
                id: recipient_id.into(),
            },
            messaging_type: Some(messaging_type),
            message: Some(OutboundText { text: text.into() }),
            sender_action: None,
        }
    }

    pub fn recipient_id(&self) -> &str {
        &self.recipient.id
    }

    pub fn text_body(&self) -> Option<&str> {
        self.message.as_ref().map(|m| m.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reply_body_matches_send_api() {
        let body = serde_json::to_value(OutboundMessage::reply("psid-1", "hi")).unwrap();
        assert_eq!(
            body,
            json!({
                "recipient": {"id": "psid-1"},
                "messaging_type": "RESPONSE",
                "message": {"text": "hi"}
            })
        );
    }

    #[test]
    fn typing_body_has_no_message() {
        let body =
            serde_json::to_value(OutboundMessage::action("psid-1", SenderAction::TypingOn))
                .unwrap();
        assert_eq!(
            body,
            json!({"recipient": {"id": "psid-1"}, "sender_action": "typing_on"})
        );
    }
}
