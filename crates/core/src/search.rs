//! Search constants, text cleanup, snippets and link-suggestion matching.

use std::sync::LazyLock;

use regex::Regex;

use crate::links::strip_legacy_links;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Queries shorter than this return nothing.
pub const MIN_QUERY_LENGTH: usize = 2;

/// Results per category in global search.
pub const RESULTS_PER_CATEGORY: i64 = 20;

/// Characters of context on each side of a snippet hit.
pub const SNIPPET_CONTEXT: usize = 100;

/// Link suggestions need a slightly longer query.
pub const MIN_SUGGESTION_QUERY_LENGTH: usize = 3;

/// Maximum number of link suggestions returned.
pub const MAX_SUGGESTIONS: usize = 10;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum page size for list endpoints.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Clamp a requested limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a requested offset to `>= 0`.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// `true` when the trimmed query is long enough to search.
pub fn is_searchable(query: &str) -> bool {
    query.trim().chars().count() >= MIN_QUERY_LENGTH
}

/// Escape `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Display text
// ---------------------------------------------------------------------------

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Turn stored HTML into one line of readable text.
pub fn clean_for_display(html: &str) -> String {
    let text = strip_legacy_links(html);
    let text = TAG_RE.replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WS_RE.replace_all(&text, " ").trim().to_string()
}

/// A window of cleaned text around the first case-insensitive hit of `term`.
///
/// Without a hit the start of the text is returned, capped at twice the
/// context length.
pub fn extract_snippet(body: &str, term: &str, context: usize) -> String {
    let text: Vec<char> = clean_for_display(body).chars().collect();
    if text.is_empty() {
        return String::new();
    }

    let needle: Vec<char> = term.trim().chars().flat_map(char::to_lowercase).collect();
    let haystack: Vec<char> = text
        .iter()
        .map(|c| c.to_lowercase().next().unwrap_or(*c))
        .collect();

    let hit = if needle.is_empty() || needle.len() > haystack.len() {
        None
    } else {
        haystack.windows(needle.len()).position(|w| w == needle.as_slice())
    };

    let Some(index) = hit else {
        return if text.len() > context * 2 {
            let head: String = text[..context * 2].iter().collect();
            format!("{head}...")
        } else {
            text.iter().collect()
        };
    };

    let start = index.saturating_sub(context);
    let end = (index + needle.len() + context).min(text.len());
    let mut snippet: String = text[start..end].iter().collect();
    if start > 0 {
        snippet.insert_str(0, "...");
    }
    if end < text.len() {
        snippet.push_str("...");
    }
    snippet
}

// ---------------------------------------------------------------------------
// Link suggestions
// ---------------------------------------------------------------------------

/// A parsed `path/filters/term` suggestion query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSuggestionQuery {
    pub path_filters: Vec<String>,
    pub term: String,
}

impl LinkSuggestionQuery {
    /// Split on `/`: everything before the last segment filters by ancestor
    /// titles, the last segment is a title prefix (possibly empty).
    pub fn parse(query: &str) -> Self {
        let parts: Vec<&str> = query.split('/').collect();
        if parts.len() == 1 {
            return Self {
                path_filters: Vec::new(),
                term: query.to_string(),
            };
        }
        let path_filters = parts[..parts.len() - 1]
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.to_string())
            .collect();
        Self {
            path_filters,
            term: parts[parts.len() - 1].to_string(),
        }
    }

    /// Whether an article whose root-first title path is `segments` matches.
    ///
    /// The last segment is the article's own title. Filters must match a
    /// contiguous run of the ancestors, ignoring case.
    pub fn matches(&self, segments: &[String]) -> bool {
        if !self.path_filters.is_empty() {
            if segments.len() <= self.path_filters.len() {
                return false;
            }
            let last_start = segments.len() - self.path_filters.len() - 1;
            let found = (0..=last_start).any(|start| {
                self.path_filters
                    .iter()
                    .zip(&segments[start..])
                    .all(|(f, s)| f.eq_ignore_ascii_case(s) || f.to_lowercase() == s.to_lowercase())
            });
            if !found {
                return false;
            }
        }

        if self.term.is_empty() {
            return true;
        }
        segments
            .last()
            .is_some_and(|title| title.to_lowercase().starts_with(&self.term.to_lowercase()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
        assert_eq!(clamp_offset(Some(-3)), 0);
    }

    #[test]
    fn short_queries_not_searchable() {
        assert!(!is_searchable(" a "));
        assert!(is_searchable("ab"));
    }

    #[test]
    fn like_escaping() {
        assert_eq!(escape_like("50%_a\\b"), "50\\%\\_a\\\\b");
    }

    #[test]
    fn cleans_tags_links_and_whitespace() {
        let html = "<p>Meet  [[3f6c1e2a-9b8d-4c7e-a1f2-0123456789ab|Ana]]</p><p>&amp; friends</p>";
        assert_eq!(clean_for_display(html), "Meet Ana & friends");
    }

    #[test]
    fn snippet_centers_on_hit() {
        let body = format!("{} dragon {}", "a".repeat(150), "b".repeat(150));
        let snippet = extract_snippet(&body, "DRAGON", 10);
        assert!(snippet.starts_with("..."));
        assert!(snippet.ends_with("..."));
        assert!(snippet.contains("dragon"));
        assert_eq!(snippet.chars().count(), 3 + 10 + 6 + 10 + 3);
    }

    #[test]
    fn snippet_without_hit_truncates() {
        let body = "x".repeat(50);
        assert_eq!(extract_snippet(&body, "zzz", 10), format!("{}...", "x".repeat(20)));
        assert_eq!(extract_snippet("short", "zzz", 10), "short");
    }

    #[test]
    fn suggestion_query_parsing() {
        assert_eq!(
            LinkSuggestionQuery::parse("characters/npcs/ple"),
            LinkSuggestionQuery {
                path_filters: vec!["characters".into(), "npcs".into()],
                term: "ple".into(),
            }
        );
        let trailing = LinkSuggestionQuery::parse("characters/");
        assert_eq!(trailing.path_filters, vec!["characters".to_string()]);
        assert_eq!(trailing.term, "");
    }

    #[test]
    fn suggestion_matching() {
        let path: Vec<String> = ["Characters", "NPCs", "Plenty"].iter().map(|s| s.to_string()).collect();
        assert!(LinkSuggestionQuery::parse("ple").matches(&path));
        assert!(LinkSuggestionQuery::parse("npcs/ple").matches(&path));
        assert!(LinkSuggestionQuery::parse("characters/").matches(&path));
        assert!(!LinkSuggestionQuery::parse("locations/ple").matches(&path));
        assert!(!LinkSuggestionQuery::parse("plenty/").matches(&path));
        assert!(!LinkSuggestionQuery::parse("xyz").matches(&path));
    }
}
