use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ConversationId;

/// A text message entering the system from one of the inbound surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub conversation_id: ConversationId,
    pub sender: Option<String>,
    pub source: MessageSource,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    /// Telegram webhook delivery.
    Webhook,
    /// Telegram long polling.
    Polling,
    /// Pre-formatted alert pushed to the ingestion endpoint.
    Alert,
}

impl InboundMessage {
    pub fn text(
        conversation_id: ConversationId,
        source: MessageSource,
        text: impl Into<String>,
    ) -> Self {
        Self {
            conversation_id,
            sender: None,
            source,
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}
