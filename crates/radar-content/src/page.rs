use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ContentError;

/// Elements whose text is never part of the readable content.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "svg", "iframe", "form", "button", "nav",
    "header", "footer", "aside", "table",
];

/// Containers tried in order when looking for the main content.
const CONTENT_ROOTS: &[&str] = &["article", "main", "[role=main]", "body"];

/// Fetches web pages and reduces them to their main readable text.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    min_chars: usize,
    max_chars: usize,
}

impl PageFetcher {
    pub fn new(client: reqwest::Client, min_chars: usize, max_chars: usize) -> Self {
        Self {
            client,
            min_chars,
            max_chars,
        }
    }

    /// Fetch `url` and return at most `max_chars` characters of main text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, ContentError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();
        if !(content_type.contains("html") || content_type.starts_with("text/")) {
            return Err(ContentError::Unsupported(content_type));
        }

        let body = response.text().await?;
        let text = if content_type.contains("html") {
            extract_main_text(&body)
        } else {
            collapse_whitespace(&body)
        };

        let len = text.chars().count();
        debug!("extracted {len} chars from {url}");
        if len < self.min_chars {
            return Err(ContentError::TooShort { len });
        }

        Ok(truncate_chars(&text, self.max_chars))
    }
}

/// Main readable text of an HTML document, whitespace-collapsed.
///
/// Prefers `<article>`, then `<main>`, then the whole `<body>`. Scripts,
/// styles, navigation chrome and tables are dropped; comments never
/// contribute text.
pub fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let root = CONTENT_ROOTS.iter().find_map(|selector| {
        let selector = Selector::parse(selector).ok()?;
        document
            .select(&selector)
            .find(|el| !collapse_whitespace(&visible_text(*el)).is_empty())
    });

    match root {
        Some(root) => collapse_whitespace(&visible_text(root)),
        None => String::new(),
    }
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if SKIPPED_ELEMENTS.contains(&child_element.value().name()) {
                continue;
            }
            collect_text(child_element, out);
            out.push(' ');
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
