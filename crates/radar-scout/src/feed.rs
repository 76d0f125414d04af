use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ScoutError;

/// One item from an RSS or Atom feed, normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// `None` when the feed gave no parseable date.
    pub published: Option<DateTime<Utc>>,
}

// RSS 2.0 nests items in <channel>; RSS 1.0 (RDF) and Atom keep them at the
// root. One document type covers all three.
#[derive(Debug, Deserialize)]
struct FeedDocument {
    channel: Option<Channel>,
    #[serde(default)]
    item: Vec<RawEntry>,
    #[serde(default)]
    entry: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    item: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    title: Option<Text>,
    #[serde(default)]
    link: Vec<Link>,
    description: Option<Text>,
    summary: Option<Text>,
    #[serde(rename = "pubDate")]
    pub_date: Option<Text>,
    published: Option<Text>,
    updated: Option<Text>,
    #[serde(rename = "dc:date")]
    dc_date: Option<Text>,
}

#[derive(Debug, Default, Deserialize)]
struct Text {
    #[serde(rename = "$text", default)]
    value: String,
}

impl Text {
    fn collapsed(&self) -> String {
        self.value.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// `<link>url</link>` in RSS, `<link href="url" rel="…"/>` in Atom.
#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
    #[serde(rename = "$text")]
    value: Option<String>,
}

impl RawEntry {
    fn link(&self) -> Option<String> {
        let atom = self
            .link
            .iter()
            .filter(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"))
            .find_map(|l| l.href.clone());
        atom.or_else(|| {
            self.link
                .iter()
                .find_map(|l| l.value.as_deref().map(str::trim).filter(|v| !v.is_empty()))
                .map(str::to_string)
        })
    }

    fn published(&self) -> Option<DateTime<Utc>> {
        [&self.pub_date, &self.published, &self.dc_date, &self.updated]
            .into_iter()
            .flatten()
            .find_map(|t| parse_date(t.value.trim()))
    }

    fn into_entry(self) -> Option<FeedEntry> {
        let link = self.link()?;
        let title = self.title.as_ref().map(Text::collapsed).unwrap_or_default();
        let summary = self
            .summary
            .as_ref()
            .or(self.description.as_ref())
            .map(Text::collapsed)
            .unwrap_or_default();
        Some(FeedEntry {
            published: self.published(),
            title,
            link,
            summary,
        })
    }
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Parse an RSS 2.0, RSS 1.0 or Atom document. Entries without a link are
/// dropped.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>, ScoutError> {
    let doc: FeedDocument =
        quick_xml::de::from_str(xml).map_err(|e| ScoutError::Feed(e.to_string()))?;

    let raw = doc
        .channel
        .map(|c| c.item)
        .unwrap_or_default()
        .into_iter()
        .chain(doc.item)
        .chain(doc.entry);

    Ok(raw.filter_map(RawEntry::into_entry).collect())
}
