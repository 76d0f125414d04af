use std::time::Duration;

use async_trait::async_trait;
use radar_common::{Error, ResolvedContent, Result};
use radar_config::AnalysisConfig;
use tracing::{info, warn};
use url::Url;

use crate::arxiv::ArxivClient;
use crate::page::{PageFetcher, truncate_chars};

const USER_AGENT: &str = concat!("radar/", env!("CARGO_PKG_VERSION"));

/// Anything that can turn a URL into bounded `(title, body)` content.
///
/// Implementations never fail: an unreachable link still yields content
/// (a placeholder body) so a batch can proceed.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn resolve(&self, url: &str) -> ResolvedContent;
}

/// How a URL's content should be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// arXiv abstract page; carries the preprint identifier.
    ArxivAbstract { id: String },
    WebPage,
}

/// Classify a URL by host and path. `arxiv_hosts` are compared
/// case-insensitively, ports ignored.
pub fn classify(url: &str, arxiv_hosts: &[String]) -> SourceKind {
    let Ok(parsed) = Url::parse(url) else {
        return SourceKind::WebPage;
    };
    let Some(host) = parsed.host_str() else {
        return SourceKind::WebPage;
    };
    if !arxiv_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)) {
        return SourceKind::WebPage;
    }

    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    // Old-style identifiers span two segments (`abs/hep-th/9901001`).
    match segments.iter().position(|seg| *seg == "abs") {
        Some(pos) if pos + 1 < segments.len() => SourceKind::ArxivAbstract {
            id: segments[pos + 1..].join("/"),
        },
        _ => SourceKind::WebPage,
    }
}

/// Limits and endpoints used by [`ContentResolver`].
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub body_max_chars: usize,
    pub min_body_chars: usize,
    pub fetch_timeout: Duration,
    pub arxiv_api_url: String,
    pub arxiv_hosts: Vec<String>,
}

impl From<&AnalysisConfig> for ResolverSettings {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            body_max_chars: config.body_max_chars,
            min_body_chars: config.min_body_chars,
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            arxiv_api_url: config.arxiv_api_url.clone(),
            arxiv_hosts: config.arxiv_hosts.clone(),
        }
    }
}

/// Resolves URLs with the arXiv API when possible and a generic page fetch
/// otherwise.
pub struct ContentResolver {
    arxiv: ArxivClient,
    pages: PageFetcher,
    arxiv_hosts: Vec<String>,
    body_max_chars: usize,
}

impl ContentResolver {
    pub fn new(settings: ResolverSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Content(format!("failed to build http client: {e}")))?;

        Ok(Self {
            arxiv: ArxivClient::new(client.clone(), settings.arxiv_api_url),
            pages: PageFetcher::new(client, settings.min_body_chars, settings.body_max_chars),
            arxiv_hosts: settings.arxiv_hosts,
            body_max_chars: settings.body_max_chars,
        })
    }
}

pub(crate) fn fallback_title(url: &str) -> String {
    format!("Enlace: {url}")
}

pub(crate) fn placeholder_body(url: &str) -> String {
    format!(
        "No se pudo extraer el contenido de {url}. Analiza el enlace a partir de su dirección y del contexto disponible."
    )
}

#[async_trait]
impl ContentSource for ContentResolver {
    async fn resolve(&self, url: &str) -> ResolvedContent {
        if let SourceKind::ArxivAbstract { id } = classify(url, &self.arxiv_hosts) {
            match self.arxiv.fetch(&id).await {
                Ok(entry) => {
                    info!("resolved arxiv {id} via metadata api");
                    return ResolvedContent::new(
                        url,
                        entry.title,
                        truncate_chars(&entry.summary, self.body_max_chars),
                    );
                }
                Err(e) => warn!("arxiv lookup for {id} failed ({e}), falling back to page fetch"),
            }
        }

        let title = fallback_title(url);
        match self.pages.fetch_text(url).await {
            Ok(body) => ResolvedContent::new(url, title, body),
            Err(e) => {
                warn!("could not extract content from {url}: {e}");
                ResolvedContent::new(url, title, placeholder_body(url))
            }
        }
    }
}
