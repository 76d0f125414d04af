use std::time::Duration;

use chrono::{DateTime, Duration as Span, Utc};
use futures::future::join_all;
use radar_common::{Error, Result};
use radar_config::{FeedSource, ScoutConfig};
use tracing::{info, warn};

use crate::compose::{AlertDigest, compose_alert};
use crate::error::ScoutError;
use crate::feed::{FeedEntry, parse_feed};
use crate::filter::{KeywordFilter, shorten};
use crate::github::GithubScout;
use crate::handoff::AlertSink;

const USER_AGENT: &str = concat!("radar-scout/", env!("CARGO_PKG_VERSION"));

/// Result of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub alerts: usize,
    pub sent: bool,
}

/// Collects high-signal items from feeds and GitHub into one alert.
pub struct Scout {
    client: reqwest::Client,
    sources: Vec<FeedSource>,
    filter: KeywordFilter,
    window: Span,
    window_hours: i64,
    title_max_chars: usize,
    github: Option<GithubScout>,
}

impl Scout {
    pub fn new(config: &ScoutConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {e}")))?;

        let github = config
            .github
            .enabled
            .then(|| GithubScout::new(client.clone(), config.github.clone()));

        Ok(Self {
            client,
            sources: config.sources.clone(),
            filter: KeywordFilter::new(&config.keywords),
            window: Span::hours(config.window_hours),
            window_hours: config.window_hours,
            title_max_chars: config.title_max_chars,
            github,
        })
    }

    /// Gather every matching item. A failing source is logged and skipped.
    pub async fn collect(&self, now: DateTime<Utc>) -> AlertDigest {
        let cutoff = now - self.window;
        let fetched = join_all(self.sources.iter().map(|source| self.fetch_feed(source))).await;

        let mut digest = AlertDigest::new();
        for (source, result) in self.sources.iter().zip(fetched) {
            let entries = match result {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("feed {} ({}) skipped: {e}", source.category, source.url);
                    continue;
                }
            };
            for entry in entries.iter().filter(|e| self.is_alert(e, cutoff)) {
                let title = shorten(&entry.title, self.title_max_chars);
                digest.push_link(&source.category, &title, &entry.link);
            }
        }

        if let Some(github) = &self.github {
            match github.search(now).await {
                Ok(repos) => {
                    for repo in &repos {
                        digest.push_repo(github.category(), repo);
                    }
                }
                Err(e) => warn!("github search skipped: {e}"),
            }
        }

        digest
    }

    /// Collect, compose and hand off one alert. Nothing is sent when there
    /// are no alerts.
    pub async fn run_once(&self, sink: &dyn AlertSink, now: DateTime<Utc>) -> Result<ScanReport> {
        let digest = self.collect(now).await;
        let alerts = digest.len();

        let Some(message) = compose_alert(&digest, self.window_hours) else {
            info!("no high-signal alerts in the last {}h", self.window_hours);
            return Ok(ScanReport { alerts, sent: false });
        };

        sink.deliver(&message).await?;
        info!("sent {alerts} alerts via {}", sink.name());
        Ok(ScanReport { alerts, sent: true })
    }

    fn is_alert(&self, entry: &FeedEntry, cutoff: DateTime<Utc>) -> bool {
        // Undated entries cannot be placed in the window.
        let Some(published) = entry.published else {
            return false;
        };
        published >= cutoff && self.filter.matches(&format!("{} {}", entry.title, entry.summary))
    }

    async fn fetch_feed(&self, source: &FeedSource) -> std::result::Result<Vec<FeedEntry>, ScoutError> {
        let response = self.client.get(&source.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Status(status.as_u16()));
        }
        let body = response.text().await?;
        parse_feed(&body)
    }
}
