//! Wiki-link extraction from article bodies.
//!
//! Two syntaxes coexist in stored bodies:
//!
//! - editor spans: `<span data-type="wiki-link" data-target-id="<uuid>">Text</span>`
//! - legacy brackets: `[[<uuid>]]` or `[[<uuid>|Text]]`

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::DbId;

const UUID_PATTERN: &str =
    "[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

static HTML_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"(?i)<span[^>]+data-target-id="({UUID_PATTERN})"[^>]*>([^<]*)</span>"#
    ))
    .expect("valid regex")
});

static LEGACY_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\[\[({UUID_PATTERN})(?:\|([^\]]+))?\]\]")).expect("valid regex")
});

/// A link found in an article body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub target_id: DbId,
    /// Trimmed display text, `None` when absent or blank.
    pub display_text: Option<String>,
    /// Byte offset of the match in the body.
    pub position: i32,
}

/// Extract every distinct link target from `body`.
///
/// Editor spans are collected before legacy brackets. When a target appears
/// more than once only its first occurrence is kept.
pub fn parse_links(body: &str) -> Vec<ParsedLink> {
    if body.is_empty() {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for re in [&*HTML_LINK_RE, &*LEGACY_LINK_RE] {
        for caps in re.captures_iter(body) {
            let Some(id) = caps.get(1).and_then(|m| DbId::parse_str(m.as_str()).ok()) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            let display_text = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            let position = caps.get(0).map_or(0, |m| m.start());
            links.push(ParsedLink {
                target_id: id,
                display_text,
                position: i32::try_from(position).unwrap_or(i32::MAX),
            });
        }
    }

    links
}

/// Replace legacy `[[id|Text]]` links with their display text (or nothing).
pub fn strip_legacy_links(text: &str) -> String {
    LEGACY_LINK_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            caps.get(2).map_or(String::new(), |m| m.as_str().to_string())
        })
        .into_owned()
}
