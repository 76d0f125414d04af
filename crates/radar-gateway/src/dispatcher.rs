use std::sync::Arc;

use futures::future::join_all;
use radar_agents::AnalysisOrchestrator;
use radar_agents::prompts::out_of_range_notice;
use radar_channels::ChannelSender;
use radar_common::{ConversationId, InboundMessage, MessageSource, ResolvedContent};
use radar_config::AppConfig;
use radar_content::{ContentSource, LinkExtractor};
use radar_security::ConversationAllowlist;
use tracing::{debug, info, instrument, warn};

use crate::command::Command;
use crate::references::ReferenceStore;

/// Routing knobs taken from the config file.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub allowlist: ConversationAllowlist,
    pub deepen_enabled: bool,
    pub link_cap: usize,
}

impl DispatchSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            allowlist: ConversationAllowlist::from_config(config.telegram.allowed_chat_id.as_deref()),
            deepen_enabled: config.analysis.deepen_enabled,
            link_cap: config.analysis.link_cap(),
        }
    }
}

/// How one inbound message was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sender not allowed; nothing was done.
    Dropped,
    /// Batch summary of this many links was produced.
    Summarized(usize),
    /// Deep dive of the item at this index was produced.
    DeepDive(usize),
    /// Deepen index outside the stored list; only the notice was sent.
    OutOfRange(usize),
    /// Free-form question answered.
    Answered,
    /// Alert without links passed through unchanged.
    Forwarded,
    /// Empty message; nothing to do.
    Ignored,
}

/// Routes inbound messages to the analysis flows and delivers the reply to
/// the same conversation.
pub struct Dispatcher {
    references: Arc<ReferenceStore>,
    resolver: Arc<dyn ContentSource>,
    analysis: AnalysisOrchestrator,
    sender: Arc<dyn ChannelSender>,
    links: LinkExtractor,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        references: Arc<ReferenceStore>,
        resolver: Arc<dyn ContentSource>,
        analysis: AnalysisOrchestrator,
        sender: Arc<dyn ChannelSender>,
        settings: DispatchSettings,
    ) -> Self {
        Self {
            references,
            resolver,
            analysis,
            sender,
            links: LinkExtractor::new(settings.link_cap),
            settings,
        }
    }

    pub fn references(&self) -> &Arc<ReferenceStore> {
        &self.references
    }

    /// Handle a chat message from the operator.
    #[instrument(skip_all, fields(conversation = %message.conversation_id, source = ?message.source))]
    pub async fn handle(&self, message: InboundMessage) -> Outcome {
        let conversation = message.conversation_id;
        if !self.settings.allowlist.is_allowed(&conversation) {
            debug!("dropping message from unauthorized conversation");
            return Outcome::Dropped;
        }
        if message.text.trim().is_empty() {
            return Outcome::Ignored;
        }

        match Command::parse(&message.text, &self.links, self.settings.deepen_enabled) {
            Command::Deepen(index) => self.deepen(&conversation, index).await,
            Command::Links(urls) => self.summarize(&conversation, urls).await,
            Command::PlainText(question) => {
                let answer = self.analysis.answer(&question).await;
                self.deliver(&conversation, &answer).await;
                Outcome::Answered
            }
        }
    }

    /// Handle a pre-formatted alert: summarize its links for `destination`,
    /// or forward it untouched when it has none.
    #[instrument(skip_all, fields(conversation = %destination, source = ?MessageSource::Alert))]
    pub async fn ingest_alert(&self, destination: &ConversationId, message: &str) -> Outcome {
        let urls = self.links.extract(message);
        if urls.is_empty() {
            info!("alert has no links, forwarding as is");
            self.deliver(destination, message).await;
            return Outcome::Forwarded;
        }
        self.summarize(destination, urls).await
    }

    async fn deepen(&self, conversation: &ConversationId, index: usize) -> Outcome {
        let Some(url) = self.references.lookup(conversation, index) else {
            let available = self.references.len(conversation);
            info!("deepen index {index} outside 1..={available}");
            let typed = (index != Command::UNREPRESENTABLE_INDEX).then_some(index);
            self.deliver(conversation, &out_of_range_notice(typed, available))
                .await;
            return Outcome::OutOfRange(index);
        };

        info!("deep dive on item {index}: {url}");
        let item = self.resolver.resolve(&url).await;
        let text = self.analysis.deep_dive(index, &item).await;
        self.deliver(conversation, &text).await;
        Outcome::DeepDive(index)
    }

    async fn summarize(&self, conversation: &ConversationId, urls: Vec<String>) -> Outcome {
        let count = urls.len();
        info!("summarizing {count} links");
        self.references.put(conversation, urls.clone());

        let items: Vec<ResolvedContent> =
            join_all(urls.iter().map(|url| self.resolver.resolve(url))).await;
        let text = self
            .analysis
            .batch_summary(&items, self.settings.deepen_enabled)
            .await;
        self.deliver(conversation, &text).await;
        Outcome::Summarized(count)
    }

    async fn deliver(&self, conversation: &ConversationId, text: &str) {
        if let Err(e) = self.sender.send_text(conversation, text).await {
            warn!(
                "failed to deliver reply via {}: {e}",
                self.sender.channel_type()
            );
        }
    }
}
