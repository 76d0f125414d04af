use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one chat conversation with the operator.
///
/// Telegram chat IDs are numeric, but channel usernames (`@name`) are accepted
/// by the Bot API too, so the identifier is kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric chat ID, when the identifier is one.
    pub fn as_chat_id(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Title and body extracted from one URL, bounded in size and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedContent {
    pub url: String,
    pub title: String,
    pub body: String,
}

impl ResolvedContent {
    pub fn new(url: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_round_trip_to_chat_id() {
        let id = ConversationId::from(-1001234567890_i64);
        assert_eq!(id.as_str(), "-1001234567890");
        assert_eq!(id.as_chat_id(), Some(-1001234567890));
    }

    #[test]
    fn usernames_are_not_chat_ids() {
        let id = ConversationId::from("@radar_alerts");
        assert_eq!(id.as_chat_id(), None);
        assert_eq!(id.to_string(), "@radar_alerts");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(ConversationId::from(" 42\n"), ConversationId::from(42_i64));
    }
}
