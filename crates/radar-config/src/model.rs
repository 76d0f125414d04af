use radar_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// Top-level configuration, usually loaded from `~/.radar/config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub analysis: AnalysisConfig,
    pub ingest: IngestConfig,
    pub scout: ScoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Per-IP request budget for the public endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub per_second: u64,
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 1,
            burst_size: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelegramMode {
    /// Telegram pushes updates to `POST /webhook`.
    #[default]
    Webhook,
    /// The bot long-polls Telegram for updates.
    Polling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    /// When set, messages from any other chat are silently dropped.
    pub allowed_chat_id: Option<String>,
    /// Destination for scout alerts and ingested alerts. Falls back to
    /// `allowed_chat_id`.
    pub alert_chat_id: Option<String>,
    pub mode: TelegramMode,
    pub max_message_chars: usize,
    pub send_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            allowed_chat_id: None,
            alert_chat_id: None,
            mode: TelegramMode::default(),
            max_message_chars: 4000,
            send_timeout_secs: 10,
        }
    }
}

impl TelegramConfig {
    pub fn alert_destination(&self) -> Option<&str> {
        non_blank(&self.alert_chat_id).or(non_blank(&self.allowed_chat_id))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// OpenAI-compatible completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub summary_max_tokens: u32,
    pub deep_dive_max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.5,
            summary_max_tokens: 600,
            deep_dive_max_tokens: 1000,
            timeout_secs: 20,
        }
    }
}

/// Upper bound for either link cap; a reference list never holds more.
pub const MAX_LINKS_PER_MESSAGE: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub deepen_enabled: bool,
    /// Link cap when deepen commands are available.
    pub max_links: usize,
    /// Link cap for the plain summary flow without deepen commands.
    pub max_links_without_deepen: usize,
    pub body_max_chars: usize,
    pub min_body_chars: usize,
    pub fetch_timeout_secs: u64,
    pub arxiv_api_url: String,
    /// Hosts whose `/abs/<id>` pages are looked up through `arxiv_api_url`.
    pub arxiv_hosts: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            deepen_enabled: true,
            max_links: 6,
            max_links_without_deepen: 4,
            body_max_chars: 2000,
            min_body_chars: 100,
            fetch_timeout_secs: 15,
            arxiv_api_url: "http://export.arxiv.org/api/query".to_string(),
            arxiv_hosts: vec![
                "arxiv.org".to_string(),
                "www.arxiv.org".to_string(),
                "export.arxiv.org".to_string(),
            ],
        }
    }
}

impl AnalysisConfig {
    pub fn link_cap(&self) -> usize {
        if self.deepen_enabled {
            self.max_links
        } else {
            self.max_links_without_deepen
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Shared secret expected in the `X-Secret-Key` header.
    pub secret_key: Option<String>,
    /// Where `radar scan` pushes its alerts. Direct Telegram delivery is used
    /// when unset.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    pub window_hours: i64,
    pub title_max_chars: usize,
    pub keywords: Vec<String>,
    pub sources: Vec<FeedSource>,
    pub github: GithubScoutConfig,
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub category: String,
    pub url: String,
}

impl FeedSource {
    fn new(category: &str, url: &str) -> Self {
        Self {
            category: category.to_string(),
            url: url.to_string(),
        }
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        let keywords = [
            "deepfake",
            "zero-day",
            "exploit",
            "bypass",
            "launch",
            "release",
            "new model",
            "SOTA",
            "demo",
            "text-to-video",
            "video generation",
            "voice cloning",
            "multimodal",
            "real-time",
            "open source",
            "detection",
            "AI red teaming",
            "adversarial",
            "synthetic media",
            "forgery",
            "hallucination",
            "agent",
            "quantum",
            "Chinese AI",
            "Kolors",
            "HunYuan",
            "ERNIE",
        ];

        let sources = vec![
            FeedSource::new(
                "🤖 Generative AI (Video)",
                "https://huggingface.co/models?pipeline_tag=text-to-video&sort=modified&rss=true",
            ),
            FeedSource::new(
                "🖼️ Generative AI (Image)",
                "https://huggingface.co/models?pipeline_tag=text-to-image&sort=modified&rss=true",
            ),
            FeedSource::new(
                "🔊 Voice & Audio",
                "https://huggingface.co/models?pipeline_tag=text-to-speech&sort=modified&rss=true",
            ),
            FeedSource::new("🌍 Beyond HF (Replicate)", "https://replicate.com/new/feed"),
            FeedSource::new(
                "🕵️ Deepfakes & Detection",
                "https://realitydefender.com/blog/rss/",
            ),
            FeedSource::new("🛡️ MITRE ATLAS", "https://atlas.mitre.org/updates.rss"),
            FeedSource::new(
                "📜 EU AI Act",
                "https://digital-strategy.ec.europa.eu/en/rss/ai-act",
            ),
            FeedSource::new("🔬 arXiv CV", "http://arxiv.org/rss/cs.CV"),
            FeedSource::new("🔐 arXiv Security", "http://arxiv.org/rss/cs.CR"),
            FeedSource::new("🌀 Quantum + AI", "http://arxiv.org/rss/quant-ph"),
            FeedSource::new(
                "🚨 CISA AI Security",
                "https://www.cisa.gov/news.xml?field_topic_target_id[9751]=9751",
            ),
            FeedSource::new(
                "📰 AI Policy (Global)",
                "https://artificialintelligenceact.eu/feed/",
            ),
        ];

        Self {
            window_hours: 24,
            title_max_chars: 80,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            sources,
            github: GithubScoutConfig::default(),
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubScoutConfig {
    pub enabled: bool,
    pub category: String,
    pub api_url: String,
    pub query: String,
    pub lookback_days: i64,
    pub min_stars: u64,
    pub per_page: u8,
    pub description_max_chars: usize,
}

impl Default for GithubScoutConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            category: "🐙 GitHub Trending (IA)".to_string(),
            api_url: "https://api.github.com/search/repositories".to_string(),
            query: "deepfake OR 'voice cloning' OR 'multimodal agent' OR 'AI red teaming' OR 'text-to-video'"
                .to_string(),
            lookback_days: 2,
            min_stars: 30,
            per_page: 5,
            description_max_chars: 60,
        }
    }
}

/// What a subcommand needs from the configuration before it can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Serve,
    Scan,
    Check,
}

impl AppConfig {
    pub fn validate(&self, requirement: Requirement) -> Result<()> {
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        match requirement {
            Requirement::Serve => {
                if !has(&self.telegram.bot_token) {
                    return Err(Error::Config("telegram.bot_token is required".into()));
                }
                if !has(&self.llm.api_key) {
                    return Err(Error::Config("llm.api_key is required".into()));
                }
            }
            Requirement::Scan => {
                if !has(&self.ingest.url) {
                    if !has(&self.telegram.bot_token) {
                        return Err(Error::Config(
                            "either ingest.url or telegram.bot_token is required".into(),
                        ));
                    }
                    if self.telegram.alert_destination().is_none() {
                        return Err(Error::Config(
                            "telegram.alert_chat_id (or allowed_chat_id) is required for direct delivery"
                                .into(),
                        ));
                    }
                }
            }
            Requirement::Check => {
                if !has(&self.llm.api_key) {
                    return Err(Error::Config("llm.api_key is required".into()));
                }
            }
        }

        for (name, cap) in [
            ("analysis.max_links", self.analysis.max_links),
            (
                "analysis.max_links_without_deepen",
                self.analysis.max_links_without_deepen,
            ),
        ] {
            if !(1..=MAX_LINKS_PER_MESSAGE).contains(&cap) {
                return Err(Error::Config(format!(
                    "{name} must be between 1 and {MAX_LINKS_PER_MESSAGE}, got {cap}"
                )));
            }
        }

        Ok(())
    }
}
