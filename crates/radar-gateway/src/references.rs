use dashmap::DashMap;
use radar_common::ConversationId;

/// Most recent batch of links per conversation.
///
/// Each `put` replaces the previous list wholesale; lists live until the next
/// batch for the same conversation or until the process exits.
#[derive(Debug, Default)]
pub struct ReferenceStore {
    links: DashMap<ConversationId, Vec<String>>,
}

impl ReferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, conversation: &ConversationId, urls: Vec<String>) {
        self.links.insert(conversation.clone(), urls);
    }

    /// Stored links, or an empty list for an unknown conversation.
    pub fn get(&self, conversation: &ConversationId) -> Vec<String> {
        self.links
            .get(conversation)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Link at 1-based `index`, if the current list has one there.
    pub fn lookup(&self, conversation: &ConversationId, index: usize) -> Option<String> {
        let entry = self.links.get(conversation)?;
        index.checked_sub(1).and_then(|i| entry.get(i).cloned())
    }

    pub fn len(&self, conversation: &ConversationId) -> usize {
        self.links.get(conversation).map_or(0, |entry| entry.len())
    }

    pub fn is_empty(&self, conversation: &ConversationId) -> bool {
        self.len(conversation) == 0
    }
}
