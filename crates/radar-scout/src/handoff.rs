use std::sync::Arc;

use async_trait::async_trait;
use radar_channels::ChannelSender;
use radar_common::{ConversationId, Error, Result};
use serde_json::json;
use tracing::info;

/// Where a composed alert goes.
#[async_trait]
pub trait AlertSink: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, message: &str) -> Result<()>;
}

/// Pushes alerts to the gateway's `/ingest-alert` endpoint so their links get
/// analyzed before they reach the operator.
pub struct IngestSink {
    client: reqwest::Client,
    url: String,
    secret: String,
}

impl IngestSink {
    pub fn new(client: reqwest::Client, url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl AlertSink for IngestSink {
    fn name(&self) -> &str {
        "ingest"
    }

    async fn deliver(&self, message: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .header("X-Secret-Key", &self.secret)
            .json(&json!({ "message": message }))
            .send()
            .await
            .map_err(|e| Error::Channel(format!("ingest request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Channel(format!("ingest endpoint answered {status}")));
        }
        Ok(())
    }
}

/// Sends alerts straight to a chat, without analysis.
pub struct ChannelSink {
    sender: Arc<dyn ChannelSender>,
    destination: ConversationId,
}

impl ChannelSink {
    pub fn new(sender: Arc<dyn ChannelSender>, destination: ConversationId) -> Self {
        Self {
            sender,
            destination,
        }
    }
}

#[async_trait]
impl AlertSink for ChannelSink {
    fn name(&self) -> &str {
        self.sender.channel_type()
    }

    async fn deliver(&self, message: &str) -> Result<()> {
        self.sender.send_text(&self.destination, message).await
    }
}

/// Prints alerts instead of sending them (`--dry-run`).
pub struct StdoutSink;

#[async_trait]
impl AlertSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn deliver(&self, message: &str) -> Result<()> {
        info!("dry run, alert not sent");
        println!("{message}");
        Ok(())
    }
}
