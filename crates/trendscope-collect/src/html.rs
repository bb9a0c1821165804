//! Minimal HTML helpers for the page-scraping collectors.
//!
//! The target portals churn their markup constantly, so the collectors work
//! from anchor tags and keyword matching rather than site-specific
//! selectors. Good enough for title harvesting, and it degrades to an empty
//! batch instead of breaking when a layout changes.

use std::sync::OnceLock;

use regex::Regex;

/// An `<a>` tag lifted out of a page.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub href: String,
    /// Contents of the `title="..."` attribute, when present.
    pub title_attr: Option<String>,
    /// Inner text with markup stripped.
    pub text: String,
    /// Plain text of the markup surrounding the anchor. Stands in for the
    /// parent element's text when classifying by nearby keywords.
    pub context: String,
}

/// How much raw markup on each side of an anchor feeds its `context`.
const CONTEXT_WINDOW: usize = 160;

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\s([^>]*)>(.*?)</a>"#).unwrap_or_else(|_| unreachable!())
    })
}

fn attr_re(name: &str) -> Regex {
    Regex::new(&format!(r#"(?i){name}\s*=\s*["']([^"']*)["']"#))
        .unwrap_or_else(|_| unreachable!())
}

/// Extracts every anchor with an `href` attribute, in document order.
#[must_use]
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    let href_re = attr_re("href");
    let title_re = attr_re("title");

    anchor_re()
        .captures_iter(html)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let attrs = caps.get(1)?.as_str();
            let inner = caps.get(2)?.as_str();
            let href = href_re.captures(attrs)?.get(1)?.as_str().trim().to_string();
            let title_attr = title_re
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|t| !t.is_empty());

            let start = full.start().saturating_sub(CONTEXT_WINDOW);
            let end = (full.end() + CONTEXT_WINDOW).min(html.len());
            let context = strip_tags(slice_at_char_boundaries(html, start, end));

            Some(Anchor {
                href,
                title_attr,
                text: strip_tags(inner),
                context,
            })
        })
        .collect()
}

/// Strips HTML tags, returning trimmed plain text.
#[must_use]
pub fn strip_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}

/// Number of characters in a title, the unit all length filters use.
/// The portals are Chinese-language, so byte length would be misleading.
#[must_use]
pub fn title_len(title: &str) -> usize {
    title.chars().count()
}

fn slice_at_char_boundaries(s: &str, mut start: usize, mut end: usize) -> &str {
    while start > 0 && !s.is_char_boundary(start) {
        start -= 1;
    }
    while end < s.len() && !s.is_char_boundary(end) {
        end += 1;
    }
    &s[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_anchor_with_href_and_text() {
        let html = r#"<div><a href="/book/123">斗破苍穹之无上巅峰传说</a></div>"#;
        let anchors = extract_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "/book/123");
        assert_eq!(anchors[0].text, "斗破苍穹之无上巅峰传说");
        assert!(anchors[0].title_attr.is_none());
    }

    #[test]
    fn extracts_title_attribute() {
        let html = r#"<a href="//v.youku.com/abc" title="热门短剧第一季">img</a>"#;
        let anchors = extract_anchors(html);
        assert_eq!(anchors[0].title_attr.as_deref(), Some("热门短剧第一季"));
    }

    #[test]
    fn anchors_without_href_are_skipped() {
        let html = r#"<a name="top">skip</a><a href="x">keep</a>"#;
        let anchors = extract_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].text, "keep");
    }

    #[test]
    fn context_includes_surrounding_text() {
        let html = r#"<span>玄幻</span><a href="/book/9">某书名某书名某书</a>"#;
        let anchors = extract_anchors(html);
        assert!(anchors[0].context.contains("玄幻"));
    }

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<b>加粗</b> 文本 <i>斜体</i>"), "加粗 文本 斜体");
    }

    #[test]
    fn title_len_counts_chars_not_bytes() {
        assert_eq!(title_len("漫剧abc"), 5);
    }

    #[test]
    fn context_window_respects_multibyte_boundaries() {
        // A run of multibyte chars right at the window edge must not panic.
        let html = format!("{}<a href=\"/x\">y</a>", "漫".repeat(200));
        let anchors = extract_anchors(&html);
        assert_eq!(anchors.len(), 1);
    }
}
