/// Case-insensitive "any keyword appears" matcher for high-signal items.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with "...".
pub fn shorten(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_case_insensitively() {
        let filter = KeywordFilter::new(["SOTA", "voice cloning", "  "]);
        assert!(filter.matches("A new sota detector"));
        assert!(filter.matches("Voice Cloning in 3 seconds"));
        assert!(!filter.matches("Weekly newsletter"));
    }

    #[test]
    fn empty_filter_matches_nothing() {
        assert!(!KeywordFilter::new(Vec::<String>::new()).matches("anything"));
    }

    #[test]
    fn shorten_marks_cuts() {
        assert_eq!(shorten("short", 80), "short");
        let long = "x".repeat(81);
        let cut = shorten(&long, 80);
        assert_eq!(cut.chars().count(), 83);
        assert!(cut.ends_with("..."));
        assert_eq!(shorten("ñandúes", 4), "ñand...");
    }
}
