use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use radar_channels::telegram::build_bot;
use radar_channels::{ChannelLifecycle, OnMessageFn, TelegramChannel};
use radar_common::{Error, Result};
use radar_config::{AppConfig, TelegramMode};
use tokio::net::TcpListener;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tracing::{info, warn};

use crate::bootstrap;
use crate::dispatcher::Dispatcher;
use crate::router::build_router;
use crate::state::AppState;

/// Long polls hold the request open; the client must outlast them.
const POLLING_CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct GatewayServer {
    config: AppConfig,
}

impl GatewayServer {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let sender = bootstrap::telegram_sender(&self.config)?;
        let dispatcher = Arc::new(bootstrap::build_dispatcher(&self.config, sender)?);

        let mut poller = match self.config.telegram.mode {
            TelegramMode::Polling => Some(self.start_polling(Arc::clone(&dispatcher)).await?),
            TelegramMode::Webhook => None,
        };

        let addr = format!("{}:{}", self.config.gateway.host, self.config.gateway.port);
        let rl = &self.config.gateway.rate_limit;

        // Per-IP rate limit from config (default: 1 req/sec, burst 30).
        let governor_conf = GovernorConfigBuilder::default()
            .per_second(rl.per_second)
            .burst_size(rl.burst_size)
            .finish()
            .ok_or_else(|| Error::Config("invalid gateway.rate_limit settings".into()))?;
        let governor_limiter = governor_conf.limiter().clone();
        let governor_layer = GovernorLayer::new(governor_conf);

        // Forget limiter state for inactive IPs.
        tokio::spawn(async move {
            let interval = Duration::from_secs(60);
            loop {
                tokio::time::sleep(interval).await;
                governor_limiter.retain_recent();
            }
        });

        let state = Arc::new(AppState::new(self.config, dispatcher));
        if state.ingest_secret.is_none() {
            warn!("ingest.secret_key not set: /ingest-alert will refuse every request");
        }
        let app = build_router(state).layer(governor_layer);

        let listener = TcpListener::bind(&addr).await?;
        info!("radar gateway listening on {addr}");

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        if let Some(poller) = poller.as_mut() {
            if let Err(e) = poller.disconnect().await {
                warn!("telegram poller did not stop cleanly: {e}");
            }
        }

        info!("radar gateway stopped");
        Ok(())
    }

    async fn start_polling(&self, dispatcher: Arc<Dispatcher>) -> Result<TelegramChannel> {
        let token = self
            .config
            .telegram
            .bot_token
            .as_deref()
            .ok_or_else(|| Error::Config("telegram.bot_token is required".into()))?;
        let bot = build_bot(token, POLLING_CLIENT_TIMEOUT)?;

        let on_message: OnMessageFn = Arc::new(move |message| {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move {
                dispatcher.handle(message).await;
            })
        });

        let mut channel = TelegramChannel::new(bot, on_message);
        channel.connect().await?;
        info!("telegram long polling enabled; /webhook stays mounted but unused");
        Ok(channel)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
