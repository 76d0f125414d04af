//! Helpers for Telegram's HTML parse mode.
//!
//! Telegram accepts a small tag set (`b`, `i`, `u`, `s`, `a`, `code`, `pre`,
//! `blockquote`, `tg-spoiler`) and rejects the whole message when a tag is left
//! open, so truncation has to close whatever it cuts through.

use std::sync::LazyLock;

use regex::Regex;

const ELLIPSIS: char = '…';

/// Escape text so it can be embedded in an HTML-mode message verbatim.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate an HTML-mode message to at most `max_chars` characters.
///
/// Cuts never land inside a tag or an entity. The kept prefix gets an ellipsis
/// and closing tags for everything still open, and the closing tags count
/// against the limit. Text that already fits is returned unchanged.
pub fn truncate_html(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let mut open: Vec<String> = Vec::new();
    let mut used = 0usize;
    let mut cut = Cut {
        byte_end: 0,
        open: Vec::new(),
    };

    for token in tokenize(input) {
        let token_chars = token.text.chars().count();
        let mut next_open = open.clone();
        match &token.kind {
            TokenKind::OpenTag(name) => next_open.push(name.clone()),
            TokenKind::CloseTag(name) => {
                if let Some(pos) = next_open.iter().rposition(|t| t == name) {
                    next_open.truncate(pos);
                }
            }
            TokenKind::Text => {}
        }

        let total = used + token_chars + 1 + closing_len(&next_open);
        if total > max_chars {
            break;
        }

        used += token_chars;
        open = next_open;
        cut = Cut {
            byte_end: token.end,
            open: open.clone(),
        };
    }

    let mut out = String::with_capacity(max_chars * 4);
    out.push_str(&input[..cut.byte_end]);
    out.push(ELLIPSIS);
    for name in cut.open.iter().rev() {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
    out
}

/// Render an HTML-mode message as plain text, for when Telegram rejects the
/// markup. Links keep their target in parentheses.
pub fn html_to_plain(input: &str) -> String {
    static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r#"(?is)<a\s+[^>]*href\s*=\s*['"]([^'"]*)['"][^>]*>(.*?)</a>"#)
            .expect("anchor regex should compile")
    });
    static TAG: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex should compile"));

    let with_links = ANCHOR.replace_all(input, "$2 ($1)");
    let stripped = TAG.replace_all(&with_links, "");
    unescape_html(&stripped)
}

fn unescape_html(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

struct Cut {
    byte_end: usize,
    open: Vec<String>,
}

enum TokenKind {
    Text,
    OpenTag(String),
    CloseTag(String),
}

struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    end: usize,
}

fn closing_len(open: &[String]) -> usize {
    open.iter().map(|name| name.chars().count() + 3).sum()
}

fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut iter = input.char_indices().peekable();

    while let Some((start, c)) = iter.next() {
        let mut end = start + c.len_utf8();
        let mut kind = TokenKind::Text;

        if c == '<'
            && let Some(rel) = input[start..].find('>')
        {
            end = start + rel + 1;
            kind = classify_tag(&input[start..end]);
        } else if c == '&'
            && let Some(rel) = input[start..].find(';')
            && rel <= 10
            && input[start + 1..start + rel]
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '#')
        {
            end = start + rel + 1;
        }

        while let Some(&(idx, _)) = iter.peek() {
            if idx >= end {
                break;
            }
            iter.next();
        }

        tokens.push(Token {
            kind,
            text: &input[start..end],
            end,
        });
    }

    tokens
}

fn classify_tag(tag: &str) -> TokenKind {
    let inner = tag.trim_start_matches('<').trim_end_matches('>').trim();
    if let Some(rest) = inner.strip_prefix('/') {
        return TokenKind::CloseTag(tag_name(rest));
    }
    if inner.ends_with('/') {
        return TokenKind::Text;
    }
    TokenKind::OpenTag(tag_name(inner))
}

fn tag_name(inner: &str) -> String {
    inner
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_balanced(html: &str) -> bool {
        let mut stack = Vec::new();
        for token in tokenize(html) {
            match token.kind {
                TokenKind::OpenTag(name) => stack.push(name),
                TokenKind::CloseTag(name) => {
                    if stack.pop().as_deref() != Some(name.as_str()) {
                        return false;
                    }
                }
                TokenKind::Text => {}
            }
        }
        stack.is_empty()
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn short_text_untouched() {
        let input = "<b>hello</b>";
        assert_eq!(truncate_html(input, 4000), input);
    }

    #[test]
    fn truncation_closes_open_anchor() {
        let links: String = (0..200)
            .map(|i| format!("• <a href='https://example.com/{i}'>Item number {i}</a>\n"))
            .collect();
        let input = format!("<b>Radar</b>\n{links}");
        let out = truncate_html(&input, 4000);

        assert!(out.chars().count() <= 4000);
        assert!(is_balanced(&out));
        assert!(out.starts_with("<b>Radar</b>"));
    }

    #[test]
    fn cut_inside_bold_closes_it() {
        let input = format!("<b>{}</b>", "x".repeat(100));
        let out = truncate_html(&input, 20);
        assert!(out.chars().count() <= 20);
        assert!(out.ends_with("…</b>"));
        assert!(is_balanced(&out));
    }

    #[test]
    fn never_cuts_inside_entity() {
        let input = "&amp;".repeat(50);
        let out = truncate_html(&input, 13);
        assert_eq!(out, "&amp;&amp;…");
    }

    #[test]
    fn nested_tags_close_in_reverse_order() {
        let input = format!("<b><i>{}</i></b>", "y".repeat(50));
        let out = truncate_html(&input, 30);
        assert!(out.ends_with("…</i></b>"));
        assert!(out.chars().count() <= 30);
    }

    #[test]
    fn multibyte_text_is_counted_in_chars() {
        let input = "ñ".repeat(50);
        let out = truncate_html(&input, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn plain_rendering_keeps_link_targets() {
        let html = "🔷 <b>MITRE</b>\n• <a href='https://atlas.mitre.org/x'>New &amp; notable</a>";
        assert_eq!(
            html_to_plain(html),
            "🔷 MITRE\n• New & notable (https://atlas.mitre.org/x)"
        );
    }
}
