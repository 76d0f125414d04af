use radar_channels::telegram_fmt::escape_html;

use crate::github::RepoHit;

/// Alert lines grouped by category, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertDigest {
    sections: Vec<(String, Vec<String>)>,
}

impl AlertDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feed item under `category`. Categories keep first-insertion order.
    pub fn push_link(&mut self, category: &str, title: &str, link: &str) {
        let line = format!("• <a href='{}'>{}</a>", escape_attr(link), escape_html(title));
        self.push_line(category, line);
    }

    pub fn push_repo(&mut self, category: &str, repo: &RepoHit) {
        let line = format!(
            "• <a href='{}'>{}</a> ({} ⭐) — {}",
            escape_attr(&repo.html_url),
            escape_html(&repo.full_name),
            repo.stars,
            escape_html(&repo.description),
        );
        self.push_line(category, line);
    }

    fn push_line(&mut self, category: &str, line: String) {
        match self.sections.iter_mut().find(|(name, _)| name == category) {
            Some((_, lines)) => lines.push(line),
            None => self.sections.push((category.to_string(), vec![line])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|(_, lines)| lines.is_empty())
    }

    /// Total number of alert lines.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|(_, lines)| lines.len()).sum()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }
}

fn escape_attr(value: &str) -> String {
    escape_html(value).replace('\'', "&#39;").replace('"', "&quot;")
}

/// Render the digest as one Telegram HTML message, or `None` when there is
/// nothing to report.
pub fn compose_alert(digest: &AlertDigest, window_hours: i64) -> Option<String> {
    if digest.is_empty() {
        return None;
    }

    let mut message =
        format!("🌌 <b>AI Radar</b> — Nuevas señales (últimas {window_hours}h)\n");
    for (category, lines) in &digest.sections {
        if lines.is_empty() {
            continue;
        }
        message.push_str(&format!("\n🔷 <b>{}</b>\n", escape_html(category)));
        message.push_str(&lines.join("\n"));
    }
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_digest_composes_nothing() {
        assert_eq!(compose_alert(&AlertDigest::new(), 24), None);
    }

    #[test]
    fn groups_lines_by_category_in_first_seen_order() {
        let mut digest = AlertDigest::new();
        digest.push_link("🔬 arXiv CV", "Paper A", "http://arxiv.org/abs/1");
        digest.push_link("🛡️ MITRE ATLAS", "Update", "https://atlas.mitre.org/u");
        digest.push_link("🔬 arXiv CV", "Paper B", "http://arxiv.org/abs/2");

        let message = compose_alert(&digest, 24).unwrap();
        assert!(message.starts_with("🌌 <b>AI Radar</b> — Nuevas señales (últimas 24h)\n"));
        let expected = "\n🔷 <b>🔬 arXiv CV</b>\n\
                        • <a href='http://arxiv.org/abs/1'>Paper A</a>\n\
                        • <a href='http://arxiv.org/abs/2'>Paper B</a>\n\
                        🔷 <b>🛡️ MITRE ATLAS</b>\n\
                        • <a href='https://atlas.mitre.org/u'>Update</a>";
        assert!(message.ends_with(expected), "{message}");
        assert_eq!(digest.len(), 3);
        assert_eq!(
            digest.categories().collect::<Vec<_>>(),
            vec!["🔬 arXiv CV", "🛡️ MITRE ATLAS"]
        );
    }

    #[test]
    fn titles_and_links_are_escaped() {
        let mut digest = AlertDigest::new();
        digest.push_link("News", "<script> & co", "https://x.example/?a=1&b='2'");

        let message = compose_alert(&digest, 24).unwrap();
        assert!(message.contains("&lt;script&gt; &amp; co"));
        assert!(message.contains("href='https://x.example/?a=1&amp;b=&#39;2&#39;'"));
    }

    #[test]
    fn repo_lines_show_stars_and_description() {
        let mut digest = AlertDigest::new();
        digest.push_repo(
            "🐙 GitHub Trending (IA)",
            &RepoHit {
                full_name: "org/voice-guard".into(),
                html_url: "https://github.com/org/voice-guard".into(),
                stars: 120,
                description: "Detect cloned voices".into(),
            },
        );
        let message = compose_alert(&digest, 24).unwrap();
        assert!(message.contains(
            "• <a href='https://github.com/org/voice-guard'>org/voice-guard</a> (120 ⭐) — Detect cloned voices"
        ));
    }
}
