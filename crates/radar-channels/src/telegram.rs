use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::ApiError;
use teloxide::RequestError;
use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, ParseMode, Recipient, Update, UpdateKind};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::telegram_fmt::{html_to_plain, truncate_html};
use crate::traits::{ChannelLifecycle, ChannelSender, ChannelStatus};
use radar_common::{ConversationId, Error, InboundMessage, MessageSource, Result};

/// Callback invoked for every text message received while long polling.
///
/// The callback owns delivery of any reply; the poller only acknowledges.
pub type OnMessageFn =
    Arc<dyn Fn(InboundMessage) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Build a bot whose HTTP client gives up after `timeout`.
pub fn build_bot(bot_token: &str, timeout: Duration) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Channel(format!("failed to build telegram http client: {e}")))?;
    Ok(Bot::with_client(bot_token, client))
}

/// Outbound Telegram delivery in HTML parse mode.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
    max_chars: usize,
}

impl TelegramSender {
    pub fn new(bot: Bot, max_chars: usize) -> Self {
        Self { bot, max_chars }
    }

    pub fn from_token(bot_token: &str, timeout: Duration, max_chars: usize) -> Result<Self> {
        Ok(Self::new(build_bot(bot_token, timeout)?, max_chars))
    }
}

fn recipient_for(conversation: &ConversationId) -> Recipient {
    match conversation.as_chat_id() {
        Some(id) => Recipient::Id(ChatId(id)),
        None => Recipient::ChannelUsername(conversation.as_str().to_string()),
    }
}

fn truncate_plain(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[async_trait]
impl ChannelSender for TelegramSender {
    fn channel_type(&self) -> &str {
        "telegram"
    }

    async fn send_text(&self, conversation: &ConversationId, text: &str) -> Result<()> {
        let recipient = recipient_for(conversation);
        let formatted = truncate_html(text, self.max_chars);

        let sent = self
            .bot
            .send_message(recipient.clone(), &formatted)
            .parse_mode(ParseMode::Html)
            .await;

        match sent {
            Ok(_) => Ok(()),
            Err(RequestError::Api(ApiError::CantParseEntities(reason))) => {
                // Markup rejected; deliver the same content without formatting.
                warn!("telegram rejected html for chat {conversation}: {reason}");
                let plain = truncate_plain(&html_to_plain(text), self.max_chars);
                self.bot
                    .send_message(recipient, plain)
                    .await
                    .map(|_| ())
                    .map_err(|e| Error::Channel(format!("telegram send failed: {e}")))
            }
            Err(e) => Err(Error::Channel(format!("telegram send failed: {e}"))),
        }
    }
}

/// Extracts chat ID and sender name from a message.
/// Returns None if the message should be ignored (e.g. from a bot or missing sender).
fn extract_message_info(msg: &teloxide::types::Message) -> Option<(i64, String)> {
    // Ignore messages without a sender (e.g. channel posts)
    let user = msg.from.as_ref()?;

    // Telegram "Group Anonymous Bot" ID used for anonymous admins.
    const ANONYMOUS_BOT_ID: u64 = 1087968824;

    // Ignore bots to prevent loops, but allow anonymous admins.
    if user.is_bot && user.id.0 != ANONYMOUS_BOT_ID {
        return None;
    }

    Some((msg.chat.id.0, user.first_name.clone()))
}

fn inbound_from_message(
    msg: &teloxide::types::Message,
    source: MessageSource,
) -> Option<InboundMessage> {
    let text = msg.text()?.trim().to_string();
    let (chat_id, user_name) = extract_message_info(msg)?;
    Some(InboundMessage::text(ConversationId::from(chat_id), source, text).with_sender(user_name))
}

/// Decode a Telegram webhook body into an inbound message.
///
/// Anything that is not a text message from a human (other update kinds,
/// media, bot echoes, malformed JSON) yields `None`.
pub fn parse_webhook_update(body: &[u8]) -> Option<InboundMessage> {
    let update: Update = match serde_json::from_slice(body) {
        Ok(update) => update,
        Err(e) => {
            debug!("ignoring undecodable telegram update: {e}");
            return None;
        }
    };

    match &update.kind {
        UpdateKind::Message(msg) => inbound_from_message(msg, MessageSource::Webhook),
        _ => None,
    }
}

/// Long-polling Telegram receiver, used when no public webhook URL exists.
pub struct TelegramChannel {
    bot: Bot,
    display: String,
    status: ChannelStatus,
    on_message: OnMessageFn,
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl TelegramChannel {
    pub fn new(bot: Bot, on_message: OnMessageFn) -> Self {
        Self {
            bot,
            display: "Telegram".to_string(),
            status: ChannelStatus::Disconnected,
            on_message,
            shutdown_tx: None,
        }
    }
}

#[async_trait]
impl ChannelLifecycle for TelegramChannel {
    fn display_name(&self) -> &str {
        &self.display
    }

    async fn connect(&mut self) -> Result<()> {
        let bot = self.bot.clone();

        // Polling and webhooks are mutually exclusive on the Bot API side.
        if let Err(e) = bot.delete_webhook().await {
            let reason = format!("failed to clear telegram webhook: {e}");
            self.status = ChannelStatus::Error(reason.clone());
            return Err(Error::Channel(reason));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_tx = Some(shutdown_tx);

        let on_message = Arc::clone(&self.on_message);

        tokio::spawn(async move {
            let handler = Update::filter_message().endpoint(
                move |bot: Bot, msg: teloxide::types::Message| {
                    let on_message = Arc::clone(&on_message);
                    async move {
                        let Some(inbound) = inbound_from_message(&msg, MessageSource::Polling)
                        else {
                            return respond(());
                        };

                        info!(
                            "telegram message from {} (chat {}): {} chars",
                            inbound.sender.as_deref().unwrap_or("unknown"),
                            inbound.conversation_id,
                            inbound.text.len()
                        );

                        let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

                        // Handle off the dispatcher task so slow analyses do not
                        // hold up other updates.
                        tokio::spawn(on_message(inbound));
                        respond(())
                    }
                },
            );

            let mut dispatcher = Dispatcher::builder(bot, handler)
                .default_handler(|upd| async move {
                    tracing::trace!("unhandled update: {:?}", upd.kind);
                })
                .build();

            let token = dispatcher.shutdown_token();
            tokio::spawn(async move {
                let mut rx = shutdown_rx;
                while rx.changed().await.is_ok() {
                    if *rx.borrow() {
                        if let Err(e) = token.shutdown() {
                            warn!("telegram shutdown token error: {e:?}");
                        }
                        break;
                    }
                }
            });

            info!("telegram bot polling started");
            dispatcher.dispatch().await;
            info!("telegram bot polling stopped");
        });

        self.status = ChannelStatus::Connected;
        info!("telegram channel connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        self.status = ChannelStatus::Disconnected;
        info!("telegram channel disconnected");
        Ok(())
    }

    fn status(&self) -> ChannelStatus {
        self.status.clone()
    }
}
