use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, warn};

use super::message::OutboundMessage;

pub const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com";
pub const DEFAULT_GRAPH_VERSION: &str = "v17.0";

/// Outcome of one Send API call. Failures are reported, never raised:
/// a reply that cannot be delivered must not abort the webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent { message_id: Option<String> },
    Failed { reason: String },
}

#[async_trait]
pub trait OutboundSender: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> DeliveryStatus;
}

pub type SharedSender = Arc<dyn OutboundSender>;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("graph request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("graph returned {status} {status_text}: {body}")]
    Status {
        status: u16,
        status_text: String,
        body: String,
    },
}

impl From<reqwest::Error> for SendError {
    /// The request URL carries the access token, so it is dropped here.
    fn from(err: reqwest::Error) -> Self {
        SendError::Transport(err.without_url())
    }
}

/// Graph API client for the page. A `mock://` base skips the network and
/// reports every message as sent.
#[derive(Clone)]
pub struct GraphSender {
    http: reqwest::Client,
    api_base: String,
    version: String,
    access_token: String,
}

impl fmt::Debug for GraphSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSender")
            .field("api_base", &self.api_base)
            .field("version", &self.version)
            .field("access_token", &"***")
            .finish()
    }
}

impl GraphSender {
    pub fn new(
        http: reqwest::Client,
        api_base: Option<String>,
        version: Option<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let base = api_base.unwrap_or_else(|| DEFAULT_GRAPH_BASE.into());
        let version = version.unwrap_or_else(|| DEFAULT_GRAPH_VERSION.into());
        Self {
            http,
            api_base: base.trim_end_matches('/').to_string(),
            version: version.trim_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    pub(crate) fn is_mock(&self) -> bool {
        self.api_base.starts_with("mock://")
    }

    /// Endpoint without the token, safe to log.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base, self.version, path)
    }

    /// POSTs `body` to `path` and returns the parsed response body. A
    /// success status with a non-JSON body yields `Value::Null`.
    pub(crate) async fn post_json(&self, path: &str, body: &Value) -> Result<Value, SendError> {
        let endpoint = self.endpoint(path);
        let response = self
            .http
            .post(&endpoint)
            .query(&[("access_token", self.access_token.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(err) => {
                    warn!(
                        endpoint = %endpoint,
                        status = status.as_u16(),
                        error = %SendError::from(err),
                        "failed to read graph error body"
                    );
                    String::new()
                }
            };
            return Err(SendError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            });
        }

        let text = response.text().await?;
        match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "graph response was not json");
                Ok(Value::Null)
            }
        }
    }
}

#[async_trait]
impl OutboundSender for GraphSender {
    async fn send(&self, message: OutboundMessage) -> DeliveryStatus {
        let recipient = message.recipient_id().to_string();
        if self.is_mock() {
            return DeliveryStatus::Sent {
                message_id: Some(format!("mock:{recipient}")),
            };
        }

        let body = match serde_json::to_value(&message) {
            Ok(body) => body,
            Err(err) => {
                error!(recipient = %recipient, error = %err, "failed to encode outbound message");
                metrics::counter!("messenger_send_failures_total").increment(1);
                return DeliveryStatus::Failed {
                    reason: err.to_string(),
                };
            }
        };

        match self.post_json("me/messages", &body).await {
            Ok(raw) => {
                let message_id = raw
                    .get("message_id")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                info!(recipient = %recipient, message_id = ?message_id, "message sent");
                metrics::counter!("messenger_messages_sent_total").increment(1);
                DeliveryStatus::Sent { message_id }
            }
            Err(err) => {
                error!(
                    recipient = %recipient,
                    endpoint = %self.endpoint("me/messages"),
                    error = %err,
                    "send api call failed"
                );
                metrics::counter!("messenger_send_failures_total").increment(1);
                DeliveryStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
