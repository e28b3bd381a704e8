//! Hashtag extraction from article bodies.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::auto_link::html_tag_ranges;

static BARE_HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s>])#([A-Za-z0-9_]+)").expect("valid regex"));

static HASHTAG_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<span[^>]*data-hashtag-name="([A-Za-z0-9_]+)"[^>]*>"#).expect("valid regex")
});

/// Longest accepted hashtag name.
pub const MAX_HASHTAG_LENGTH: usize = 100;

/// A hashtag occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedHashtag {
    /// Lowercased name without the leading `#`.
    pub name: String,
    /// Byte offset of the `#` (or of the span for editor hashtags).
    pub position: i32,
}

/// Extract distinct hashtags in order of first appearance.
///
/// Recognises editor spans carrying `data-hashtag-name` and bare `#name`
/// tokens at the start of the text or after whitespace. Tokens inside HTML
/// tags (for example `style="color: #fff"`) are ignored.
pub fn parse_hashtags(body: &str) -> Vec<ParsedHashtag> {
    if body.is_empty() {
        return Vec::new();
    }

    let tags = html_tag_ranges(body);
    let inside_tag = |pos: usize| tags.iter().any(|&(s, e)| pos > s && pos < e);

    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in HASHTAG_SPAN_RE.captures_iter(body) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            found.push((whole.start(), name.as_str().to_lowercase()));
        }
    }

    for caps in BARE_HASHTAG_RE.captures_iter(body) {
        if let Some(name) = caps.get(1) {
            let hash_pos = name.start() - 1;
            if inside_tag(hash_pos) {
                continue;
            }
            found.push((hash_pos, name.as_str().to_lowercase()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|(_, name)| name.len() <= MAX_HASHTAG_LENGTH && seen.insert(name.clone()))
        .map(|(pos, name)| ParsedHashtag {
            name,
            position: i32::try_from(pos).unwrap_or(i32::MAX),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(body: &str) -> Vec<String> {
        parse_hashtags(body).into_iter().map(|h| h.name).collect()
    }

    #[test]
    fn finds_bare_hashtags() {
        assert_eq!(names("#Dragons and #loot_table"), vec!["dragons", "loot_table"]);
    }

    #[test]
    fn ignores_entities_and_mid_word_hashes() {
        assert!(names("it&#39;s issue#4").is_empty());
    }

    #[test]
    fn ignores_hashes_inside_tags() {
        assert_eq!(names(r#"<p style="color: #fff">#red</p>"#), vec!["red"]);
    }

    #[test]
    fn editor_spans_are_deduplicated_with_text() {
        let body = r#"<span data-type="hashtag" data-hashtag-name="Ruins">#Ruins</span> #ruins"#;
        let tags = parse_hashtags(body);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "ruins");
        assert_eq!(tags[0].position, 0);
    }

    #[test]
    fn positions_point_at_hash() {
        let tags = parse_hashtags("a #b");
        assert_eq!(tags[0].position, 2);
    }
}
