use std::sync::Arc;
use std::time::Duration;

use radar_agents::{AnalysisOrchestrator, AnalysisSettings, LlmProvider, OpenAiProvider};
use radar_channels::{ChannelSender, TelegramSender};
use radar_common::{Error, Result};
use radar_config::AppConfig;
use radar_content::{ContentResolver, ResolverSettings};

use crate::dispatcher::{DispatchSettings, Dispatcher};
use crate::references::ReferenceStore;

/// Outbound Telegram sender configured from `telegram.*`.
pub fn telegram_sender(config: &AppConfig) -> Result<Arc<TelegramSender>> {
    let token = config
        .telegram
        .bot_token
        .as_deref()
        .ok_or_else(|| Error::Config("telegram.bot_token is required".into()))?;
    let sender = TelegramSender::from_token(
        token,
        Duration::from_secs(config.telegram.send_timeout_secs),
        config.telegram.max_message_chars,
    )?;
    Ok(Arc::new(sender))
}

/// OpenAI-compatible provider configured from `llm.*`.
pub fn llm_provider(config: &AppConfig) -> Result<Arc<dyn LlmProvider>> {
    let api_key = config
        .llm
        .api_key
        .clone()
        .ok_or_else(|| Error::Config("llm.api_key is required".into()))?;
    // The orchestrator enforces the per-call budget; the client timeout is a backstop.
    let provider = OpenAiProvider::with_timeout(
        api_key,
        config.llm.base_url.clone(),
        Duration::from_secs(config.llm.timeout_secs + 5),
    )?;
    Ok(Arc::new(provider))
}

/// Wire the dispatcher with its production collaborators.
pub fn build_dispatcher(config: &AppConfig, sender: Arc<dyn ChannelSender>) -> Result<Dispatcher> {
    let resolver = ContentResolver::new(ResolverSettings::from(&config.analysis))?;
    let analysis = AnalysisOrchestrator::new(
        llm_provider(config)?,
        AnalysisSettings::from(&config.llm),
    );

    Ok(Dispatcher::new(
        Arc::new(ReferenceStore::new()),
        Arc::new(resolver),
        analysis,
        sender,
        DispatchSettings::from_config(config),
    ))
}
