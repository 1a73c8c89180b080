//! Page-level Messenger profile setup.

use serde_json::json;
use tracing::info;

use super::sender::{GraphSender, SendError};

impl GraphSender {
    /// Registers the "Get Started" button so a first-time user's tap arrives
    /// as a postback carrying `payload`.
    pub async fn ensure_get_started(&self, payload: &str) -> Result<(), SendError> {
        if self.is_mock() {
            return Ok(());
        }
        let body = json!({ "get_started": { "payload": payload } });
        self.post_json("me/messenger_profile", &body).await?;
        info!(
            endpoint = %self.endpoint("me/messenger_profile"),
            payload,
            "get started button configured"
        );
        Ok(())
    }
}
