//! Auto-link discovery: find plain-text mentions of other articles.
//!
//! The API returns match positions only; the editor inserts the link spans
//! after the user confirms them.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::types::DbId;

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

static WIKI_LINK_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span[^>]*data-type="wiki-link"[^>]*>.*?</span>"#).expect("valid regex")
});

static EXTERNAL_LINK_SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<span[^>]*data-type="external-link"[^>]*>.*?</span>"#)
        .expect("valid regex")
});

static LEGACY_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([a-fA-F0-9\-]{36})(?:\|([^\]]+))?\]\]").expect("valid regex")
});

/// A term that should link to an article when it appears in the body.
#[derive(Debug, Clone)]
pub struct LinkCandidate {
    pub article_id: DbId,
    pub article_title: String,
    /// The text to look for: the title itself or one of its aliases.
    pub term: String,
    pub is_alias: bool,
}

/// One proposed link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoLinkMatch {
    pub matched_text: String,
    pub article_id: DbId,
    pub article_title: String,
    pub start: usize,
    pub end: usize,
    pub is_alias_match: bool,
}

/// Byte ranges of every HTML tag in `body`.
pub(crate) fn html_tag_ranges(body: &str) -> Vec<(usize, usize)> {
    HTML_TAG_RE
        .find_iter(body)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// Ranges that must never receive a new link.
fn protected_ranges(body: &str) -> Vec<(usize, usize)> {
    let mut ranges = html_tag_ranges(body);
    for re in [&*WIKI_LINK_SPAN_RE, &*EXTERNAL_LINK_SPAN_RE, &*LEGACY_LINK_RE] {
        ranges.extend(re.find_iter(body).map(|m| (m.start(), m.end())));
    }
    ranges
}

fn overlaps(start: usize, end: usize, ranges: &[(usize, usize)]) -> bool {
    ranges.iter().any(|&(s, e)| start < e && end > s)
}

/// Find every linkable mention of `candidates` in `body`.
///
/// Longer terms are tried first so "Waterdeep" wins over "Water". Matching
/// is case-insensitive on word boundaries; text inside tags, existing links
/// and already-claimed ranges is skipped. Results are ordered by position.
pub fn find_auto_links(body: &str, candidates: &[LinkCandidate]) -> Vec<AutoLinkMatch> {
    if body.trim().is_empty() || candidates.is_empty() {
        return Vec::new();
    }

    let protected = protected_ranges(body);

    let mut terms: Vec<&LinkCandidate> = candidates
        .iter()
        .filter(|c| !c.term.trim().is_empty())
        .collect();
    terms.sort_by(|a, b| b.term.chars().count().cmp(&a.term.chars().count()));

    let mut used: Vec<(usize, usize)> = Vec::new();
    let mut matches = Vec::new();

    for candidate in terms {
        let pattern = format!(r"\b{}\b", regex::escape(&candidate.term));
        let Ok(re) = RegexBuilder::new(&pattern).case_insensitive(true).build() else {
            continue;
        };

        for m in re.find_iter(body) {
            if overlaps(m.start(), m.end(), &protected) || overlaps(m.start(), m.end(), &used) {
                continue;
            }
            used.push((m.start(), m.end()));
            matches.push(AutoLinkMatch {
                matched_text: m.as_str().to_string(),
                article_id: candidate.article_id,
                article_title: candidate.article_title.clone(),
                start: m.start(),
                end: m.end(),
                is_alias_match: candidate.is_alias,
            });
        }
    }

    matches.sort_by_key(|m| m.start);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, term: &str, is_alias: bool) -> LinkCandidate {
        LinkCandidate {
            article_id: DbId::from_u128(title.len() as u128),
            article_title: title.to_string(),
            term: term.to_string(),
            is_alias,
        }
    }

    #[test]
    fn empty_body_yields_nothing() {
        let c = vec![candidate("Water", "Water", false)];
        assert!(find_auto_links("   ", &c).is_empty());
    }

    #[test]
    fn longer_terms_win() {
        let c = vec![
            candidate("Water", "Water", false),
            candidate("Waterdeep", "Waterdeep", false),
        ];
        let found = find_auto_links("We sailed to waterdeep by water.", &c);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].article_title, "Waterdeep");
        assert_eq!(found[0].matched_text, "waterdeep");
        assert_eq!(found[1].article_title, "Water");
    }

    #[test]
    fn whole_words_only() {
        let c = vec![candidate("Orc", "Orc", false)];
        assert!(find_auto_links("The orchard was quiet", &c).is_empty());
    }

    #[test]
    fn skips_tags_and_existing_links() {
        let c = vec![candidate("Ember", "Ember", false)];
        let body = concat!(
            r#"<p title="Ember">"#,
            r#"<span data-type="wiki-link" data-target-id="x">Ember</span> "#,
            "[[3f6c1e2a-9b8d-4c7e-a1f2-0123456789ab|Ember]] Ember</p>"
        );
        let found = find_auto_links(body, &c);
        assert_eq!(found.len(), 1);
        assert_eq!(&body[found[0].start..found[0].end], "Ember");
        assert!(found[0].start > body.find("]]").unwrap());
    }

    #[test]
    fn alias_matches_are_flagged() {
        let c = vec![
            candidate("Lord Vex", "Lord Vex", false),
            candidate("Lord Vex", "The Pale King", true),
        ];
        let found = find_auto_links("Beware the pale king.", &c);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_alias_match);
        assert_eq!(found[0].article_title, "Lord Vex");
    }

    #[test]
    fn terms_with_regex_characters_are_escaped() {
        let c = vec![candidate("Dr. Grim", "Dr. Grim", false)];
        assert!(find_auto_links("Ask DrX Grim", &c).is_empty());
        let found = find_auto_links("Ask Dr. Grim now", &c);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 4);
    }
}
