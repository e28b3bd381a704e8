//! Slug generation and uniqueness helpers.
//!
//! Slugs identify articles within one level of the tree and worlds within an
//! owner's list, so the same title can produce different slugs depending on
//! what already exists next to it.

use crate::error::CoreError;

/// Longest slug accepted from clients.
pub const MAX_SLUG_LENGTH: usize = 200;

/// Fallback slug when a title has no usable characters.
pub const EMPTY_SLUG_FALLBACK: &str = "untitled";

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a URL-safe slug from a title.
///
/// Lowercases, turns every run of non-alphanumeric characters into a single
/// hyphen, and trims hyphens from both ends.
pub fn generate_slug(title: &str) -> String {
    let mut result = String::with_capacity(title.len());
    let mut prev_hyphen = false;
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c);
            prev_hyphen = false;
        } else if !prev_hyphen {
            result.push('-');
            prev_hyphen = true;
        }
    }

    let trimmed = result.trim_matches('-');
    let trimmed = if trimmed.len() > MAX_SLUG_LENGTH {
        trimmed[..MAX_SLUG_LENGTH].trim_end_matches('-')
    } else {
        trimmed
    };

    if trimmed.is_empty() {
        EMPTY_SLUG_FALLBACK.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Pick `base` if free, otherwise the first free `base-2`, `base-3`, ...
///
/// Comparison is exact; callers pass slugs already scoped to one location.
pub fn unique_slug<S: AsRef<str>>(base: &str, existing: &[S]) -> String {
    let taken = |candidate: &str| existing.iter().any(|s| s.as_ref() == candidate);
    if !taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Slug for virtual tree nodes (campaigns, arcs, sessions).
pub fn virtual_group_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Only lowercase ASCII letters, digits and hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Validate a client-supplied slug.
pub fn validate_slug(slug: &str) -> Result<(), CoreError> {
    if slug.is_empty() {
        return Err(CoreError::Validation("Slug must not be empty".into()));
    }
    if !is_valid_slug(slug) {
        return Err(CoreError::Validation(format!(
            "Slug must be at most {MAX_SLUG_LENGTH} characters of lowercase letters, digits and hyphens"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
