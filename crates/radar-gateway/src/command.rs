use std::sync::LazyLock;

use radar_content::LinkExtractor;
use regex::Regex;

/// What an inbound message asks for, decided before any routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Deeper analysis of the item at this 1-based position. An index too
    /// large for `usize` is [`Command::UNREPRESENTABLE_INDEX`].
    Deepen(usize),
    /// Links to summarize, in first-seen order.
    Links(Vec<String>),
    /// Anything else: a free-form question.
    PlainText(String),
}

static DEEPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:profundiza(?:\s+sobre)?(?:\s+(?:la|el))?|(?:go\s+)?deeper(?:\s+on)?)\s+#?(\d+)\s*[.!?]?\s*$",
    )
    .expect("deepen regex should compile")
});

impl Command {
    pub const UNREPRESENTABLE_INDEX: usize = usize::MAX;

    /// Classify `text`. With `deepen_enabled` off, deepen syntax is just text.
    pub fn parse(text: &str, links: &LinkExtractor, deepen_enabled: bool) -> Self {
        if deepen_enabled {
            if let Some(caps) = DEEPEN.captures(text) {
                // Overflowing indices stay commands and fail the range check.
                let index = caps[1].parse().unwrap_or(Self::UNREPRESENTABLE_INDEX);
                return Command::Deepen(index);
            }
        }

        let urls = links.extract(text);
        if urls.is_empty() {
            Command::PlainText(text.trim().to_string())
        } else {
            Command::Links(urls)
        }
    }
}
