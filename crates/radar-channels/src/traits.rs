use async_trait::async_trait;
use radar_common::{ConversationId, Result};

/// Lifecycle management for a messaging channel that receives updates itself
/// (connect, disconnect, status).
#[async_trait]
pub trait ChannelLifecycle: Send {
    /// Human-readable display name.
    fn display_name(&self) -> &str;

    /// Start receiving updates from the external service.
    async fn connect(&mut self) -> Result<()>;

    /// Stop receiving updates.
    async fn disconnect(&mut self) -> Result<()>;

    /// Current connection status.
    fn status(&self) -> ChannelStatus;
}

/// Send-only interface for delivering outbound messages through a channel.
///
/// Designed to be wrapped in `Arc` and shared between the dispatcher and the
/// scout.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Unique identifier for this channel type.
    fn channel_type(&self) -> &str;

    /// Deliver HTML-formatted text to a conversation.
    async fn send_text(&self, conversation: &ConversationId, text: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Disconnected,
    Connected,
    Error(String),
}
