use std::sync::LazyLock;

use regex::Regex;

/// Finds `http`/`https` URLs in free-form text.
///
/// A URL ends at whitespace, a closing parenthesis, a quote or an angle
/// bracket, so links inside `<a href='…'>` markup are picked up cleanly.
/// Matches keep their first-seen order and duplicates are kept.
#[derive(Debug, Clone, Copy)]
pub struct LinkExtractor {
    cap: usize,
}

impl LinkExtractor {
    pub fn new(cap: usize) -> Self {
        Self { cap }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Return at most `cap` URLs. An empty result means the text carries no
    /// links and should be treated as a plain question.
    pub fn extract(&self, text: &str) -> Vec<String> {
        static URL: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r#"https?://[^\s)'"<>]+"#).expect("url regex should compile")
        });

        URL.find_iter(text)
            .take(self.cap)
            .map(|m| m.as_str().replace("&amp;", "&"))
            .collect()
    }
}
