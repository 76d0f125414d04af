use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use radar_common::ConversationId;
use radar_config::{AppConfig, Requirement};
use radar_gateway::bootstrap::telegram_sender;
use radar_scout::{AlertSink, ChannelSink, IngestSink, Scout, StdoutSink};
use tracing::{error, info};

pub async fn run(config: AppConfig, dry_run: bool, every: Option<u64>) -> Result<()> {
    if !dry_run {
        config.validate(Requirement::Scan)?;
    }

    let scout = Scout::new(&config.scout)?;
    let sink = build_sink(&config, dry_run)?;

    let Some(minutes) = every else {
        let report = scout.run_once(sink.as_ref(), chrono::Utc::now()).await?;
        info!("scan finished: {} alerts, sent: {}", report.alerts, report.sent);
        return Ok(());
    };

    let period = Duration::from_secs(minutes.max(1) * 60);
    let mut ticker = tokio::time::interval(period);
    info!("scanning every {minutes} minutes");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match scout.run_once(sink.as_ref(), chrono::Utc::now()).await {
                    Ok(report) => info!("scan finished: {} alerts, sent: {}", report.alerts, report.sent),
                    Err(e) => error!("scan failed: {e}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("stopping periodic scan");
                return Ok(());
            }
        }
    }
}

fn build_sink(config: &AppConfig, dry_run: bool) -> Result<Box<dyn AlertSink>> {
    if dry_run {
        return Ok(Box::new(StdoutSink));
    }

    if let Some(url) = config.ingest.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let secret = config
            .ingest
            .secret_key
            .clone()
            .context("ingest.secret_key is required when ingest.url is set")?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.telegram.send_timeout_secs))
            .build()?;
        return Ok(Box::new(IngestSink::new(client, url, secret)));
    }

    let destination = config
        .telegram
        .alert_destination()
        .context("telegram.alert_chat_id is required for direct delivery")?;
    Ok(Box::new(ChannelSink::new(
        telegram_sender(config)?,
        ConversationId::new(destination),
    )))
}
