use chrono::{DateTime, Duration, Utc};
use radar_config::GithubScoutConfig;
use serde::Deserialize;
use tracing::debug;

use crate::error::ScoutError;

/// A freshly created repository with enough stars to be worth a look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHit {
    pub full_name: String,
    pub html_url: String,
    pub stars: u64,
    pub description: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    full_name: String,
    html_url: String,
    stargazers_count: u64,
    description: Option<String>,
}

/// Repository search against the GitHub API.
#[derive(Clone)]
pub struct GithubScout {
    client: reqwest::Client,
    config: GithubScoutConfig,
}

impl GithubScout {
    pub fn new(client: reqwest::Client, config: GithubScoutConfig) -> Self {
        Self { client, config }
    }

    pub fn category(&self) -> &str {
        &self.config.category
    }

    /// Search query for repositories created after the lookback cutoff.
    pub fn query(&self, now: DateTime<Utc>) -> String {
        let since = now - Duration::days(self.config.lookback_days);
        format!("{} created:>{}", self.config.query, since.format("%Y-%m-%d"))
    }

    /// Top repositories by stars, keeping those at or above `min_stars`.
    pub async fn search(&self, now: DateTime<Utc>) -> Result<Vec<RepoHit>, ScoutError> {
        let query = self.query(now);
        debug!("github search: {query}");

        let per_page = self.config.per_page.to_string();
        let response = self
            .client
            .get(&self.config.api_url)
            .header("Accept", "application/vnd.github+json")
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScoutError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .filter(|item| item.stargazers_count >= self.config.min_stars)
            .map(|item| RepoHit {
                full_name: item.full_name,
                html_url: item.html_url,
                stars: item.stargazers_count,
                description: item
                    .description
                    .unwrap_or_default()
                    .chars()
                    .take(self.config.description_max_chars)
                    .collect(),
            })
            .collect())
    }
}
