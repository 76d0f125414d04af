use serde::Deserialize;
use tracing::debug;

use crate::error::ContentError;

/// Title and abstract of one preprint, whitespace-normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractEntry {
    pub title: String,
    pub summary: String,
}

/// Client for the arXiv query API (Atom responses).
#[derive(Clone)]
pub struct ArxivClient {
    client: reqwest::Client,
    api_url: String,
}

impl ArxivClient {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub async fn fetch(&self, id: &str) -> Result<AbstractEntry, ContentError> {
        debug!("querying arxiv metadata for {id}");
        let body = self
            .client
            .get(&self.api_url)
            .query(&[("id_list", id)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_abstract(&body)
    }
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    id: Option<TextNode>,
    title: Option<TextNode>,
    summary: Option<TextNode>,
}

#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    text: String,
}

impl TextNode {
    fn normalized(&self) -> String {
        self.text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Pull the first entry out of an arXiv Atom response.
///
/// arXiv reports unknown IDs as a regular entry whose `id` points at its
/// error documentation; that counts as a missing entry.
pub fn parse_abstract(xml: &str) -> Result<AbstractEntry, ContentError> {
    let feed: AtomFeed =
        quick_xml::de::from_str(xml).map_err(|e| ContentError::Xml(e.to_string()))?;

    let entry = feed.entries.first().ok_or(ContentError::MissingEntry)?;

    if entry
        .id
        .as_ref()
        .is_some_and(|id| id.text.contains("/api/errors"))
    {
        return Err(ContentError::MissingEntry);
    }

    let title = entry
        .title
        .as_ref()
        .map(TextNode::normalized)
        .filter(|t| !t.is_empty())
        .ok_or(ContentError::MissingField("title"))?;
    let summary = entry
        .summary
        .as_ref()
        .map(TextNode::normalized)
        .filter(|s| !s.is_empty())
        .ok_or(ContentError::MissingField("summary"))?;

    Ok(AbstractEntry { title, summary })
}
