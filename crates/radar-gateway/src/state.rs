use std::sync::Arc;

use radar_common::ConversationId;
use radar_config::AppConfig;
use radar_security::SharedSecret;
use tracing::warn;

use crate::dispatcher::Dispatcher;

/// State shared by every request handler.
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: Arc<Dispatcher>,
    /// `None` when no ingest secret is configured; ingestion is then refused.
    pub ingest_secret: Option<SharedSecret>,
    /// Conversation that receives analyses of ingested alerts.
    pub alert_destination: Option<ConversationId>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(config: AppConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let ingest_secret = config
            .ingest
            .secret_key
            .as_deref()
            .and_then(|secret| match SharedSecret::new(secret) {
                Ok(secret) => Some(secret),
                Err(e) => {
                    warn!("ingest secret unusable, /ingest-alert will refuse requests: {e}");
                    None
                }
            });
        let alert_destination = config.telegram.alert_destination().map(ConversationId::new);

        Self {
            config,
            dispatcher,
            ingest_secret,
            alert_destination,
        }
    }
}
