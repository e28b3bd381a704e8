//! Field validation shared by handlers.
//!
//! Limits mirror the column comments in the migrations.

use std::collections::HashSet;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;
pub const MAX_WORLD_NAME_LENGTH: usize = 200;
pub const MAX_WORLD_DESCRIPTION_LENGTH: usize = 1000;
pub const MAX_CAMPAIGN_NAME_LENGTH: usize = 200;
pub const MAX_ARC_NAME_LENGTH: usize = 200;
pub const MAX_SESSION_NAME_LENGTH: usize = 500;
pub const MAX_ARTICLE_TITLE_LENGTH: usize = 500;
pub const MAX_ICON_LENGTH: usize = 50;
pub const MAX_IN_GAME_DATE_LENGTH: usize = 100;
pub const MAX_QUEST_TITLE_LENGTH: usize = 300;
pub const MAX_ALIAS_LENGTH: usize = 200;
pub const MAX_LINK_TITLE_LENGTH: usize = 200;
pub const MAX_URL_LENGTH: usize = 2048;

/// Public slugs share the URL namespace with these routes.
pub const RESERVED_PUBLIC_SLUGS: &[&str] = &["api", "admin", "public", "login", "logout", "worlds"];
pub const MIN_PUBLIC_SLUG_LENGTH: usize = 3;
pub const MAX_PUBLIC_SLUG_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// Generic helpers
// ---------------------------------------------------------------------------

/// Trim and map blank text to `None`.
pub fn normalize_optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Trimmed, non-empty, at most `max` characters.
pub fn require_text(field: &str, value: &str, max: usize) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    check_max(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// At most `max` characters (counted as chars, not bytes).
pub fn check_max(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    if value.chars().count() > max {
        return Err(CoreError::Validation(format!(
            "{field} must be {max} characters or fewer"
        )));
    }
    Ok(())
}

/// Optional field: trimmed, blank becomes `None`, length checked.
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<Option<String>, CoreError> {
    let normalized = normalize_optional(value);
    if let Some(ref v) = normalized {
        check_max(field, v, max)?;
    }
    Ok(normalized)
}

// ---------------------------------------------------------------------------
// Aliases
// ---------------------------------------------------------------------------

/// Parse a comma-separated alias list for an article titled `title`.
///
/// Entries are trimmed and blanks dropped. Duplicates (ignoring case) are
/// collapsed to the first spelling. An alias equal to the title is rejected.
pub fn parse_aliases(raw: &str, title: &str) -> Result<Vec<String>, CoreError> {
    let title_lower = title.trim().to_lowercase();
    let mut seen = HashSet::new();
    let mut aliases = Vec::new();

    for part in raw.split(',') {
        let alias = part.trim();
        if alias.is_empty() {
            continue;
        }
        if alias.chars().count() > MAX_ALIAS_LENGTH {
            return Err(CoreError::Validation(format!(
                "Alias '{alias}' must be {MAX_ALIAS_LENGTH} characters or fewer"
            )));
        }
        let lower = alias.to_lowercase();
        if !title_lower.is_empty() && lower == title_lower {
            return Err(CoreError::Validation(format!(
                "Alias '{alias}' cannot be the same as the article title"
            )));
        }
        if seen.insert(lower) {
            aliases.push(alias.to_string());
        }
    }

    Ok(aliases)
}

// ---------------------------------------------------------------------------
// Public slugs and URLs
// ---------------------------------------------------------------------------

/// Trim and lowercase a requested public slug.
pub fn normalize_public_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Describe why `slug` (already normalized) cannot be a public slug.
pub fn public_slug_error(slug: &str) -> Option<String> {
    let len = slug.chars().count();
    if !(MIN_PUBLIC_SLUG_LENGTH..=MAX_PUBLIC_SLUG_LENGTH).contains(&len) {
        return Some(format!(
            "Public slug must be between {MIN_PUBLIC_SLUG_LENGTH} and {MAX_PUBLIC_SLUG_LENGTH} characters"
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Some("Public slug may only contain lowercase letters, numbers, and hyphens".into());
    }
    if slug.starts_with('-') || slug.ends_with('-') {
        return Some("Public slug cannot start or end with a hyphen".into());
    }
    if RESERVED_PUBLIC_SLUGS.contains(&slug) {
        return Some(format!("'{slug}' is reserved"));
    }
    None
}

/// Absolute `http`/`https` URL with a host.
pub fn validate_url(url: &str) -> Result<String, CoreError> {
    let trimmed = url.trim();
    check_max("URL", trimmed, MAX_URL_LENGTH)?;
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| CoreError::Validation("URL must start with http:// or https://".into()))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or("");
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(CoreError::Validation("URL must include a host".into()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn require_text_trims() {
        assert_eq!(require_text("Name", "  Arc 1 ", 10).unwrap(), "Arc 1");
    }

    #[test]
    fn require_text_rejects_blank_and_long() {
        assert_matches!(require_text("Name", "   ", 10), Err(CoreError::Validation(_)));
        assert_matches!(require_text("Name", "abcdef", 5), Err(CoreError::Validation(_)));
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(optional_text("Notes", Some("  "), 10).unwrap(), None);
        assert_eq!(optional_text("Notes", None, 10).unwrap(), None);
    }

    #[test]
    fn aliases_dedupe_case_insensitively() {
        let aliases = parse_aliases("The Duke, the duke , ,Vex", "Lord Vex").unwrap();
        assert_eq!(aliases, vec!["The Duke", "Vex"]);
    }

    #[test]
    fn alias_equal_to_title_rejected() {
        assert_matches!(
            parse_aliases("lord vex", "Lord Vex"),
            Err(CoreError::Validation(msg)) if msg.contains("same as the article title")
        );
    }

    #[test]
    fn alias_too_long_rejected() {
        let long = "x".repeat(MAX_ALIAS_LENGTH + 1);
        assert!(parse_aliases(&long, "Title").is_err());
    }

    #[test]
    fn empty_alias_list_is_ok() {
        assert!(parse_aliases("", "Title").unwrap().is_empty());
    }

    #[test]
    fn public_slug_rules() {
        assert_eq!(public_slug_error("my-world"), None);
        assert!(public_slug_error("ab").is_some());
        assert!(public_slug_error("My World").is_some());
        assert!(public_slug_error("-abc").is_some());
        assert!(public_slug_error("admin").is_some());
        assert_eq!(normalize_public_slug("  My-World "), "my-world");
    }

    #[test]
    fn urls() {
        assert_eq!(validate_url(" https://dndbeyond.com/x ").unwrap(), "https://dndbeyond.com/x");
        assert!(validate_url("ftp://x").is_err());
        assert!(validate_url("https://").is_err());
    }
}
