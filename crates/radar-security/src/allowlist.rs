use radar_common::ConversationId;
use tracing::debug;

/// Restricts the bot to a single operator conversation.
///
/// An unrestricted allowlist accepts every conversation.
#[derive(Debug, Clone, Default)]
pub struct ConversationAllowlist {
    allowed: Option<ConversationId>,
}

impl ConversationAllowlist {
    pub fn unrestricted() -> Self {
        Self { allowed: None }
    }

    pub fn single(id: ConversationId) -> Self {
        Self { allowed: Some(id) }
    }

    /// Build from an optional configured chat ID; blank values mean unrestricted.
    pub fn from_config(allowed: Option<&str>) -> Self {
        match allowed.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => Self::single(ConversationId::new(id)),
            None => Self::unrestricted(),
        }
    }

    pub fn is_restricted(&self) -> bool {
        self.allowed.is_some()
    }

    pub fn is_allowed(&self, conversation: &ConversationId) -> bool {
        let allowed = match &self.allowed {
            Some(id) => id == conversation,
            None => true,
        };
        if !allowed {
            debug!("conversation {conversation} is not on the allowlist");
        }
        allowed
    }
}
