//! Rules for world document uploads.

use crate::error::CoreError;
use crate::types::DbId;

/// 200 MiB.
pub const MAX_DOCUMENT_SIZE_BYTES: i64 = 209_715_200;

/// Stored file names are cut to this many characters (extension kept).
pub const MAX_STORED_FILE_NAME_LENGTH: usize = 200;

/// Give up looking for a free `Title (n)` after this many attempts.
pub const MAX_TITLE_SUFFIX: usize = 1000;

/// Extension (lowercase, no dot) to canonical MIME type.
const MIME_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (
        "pptx",
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    ),
    ("txt", "text/plain"),
    ("md", "text/markdown"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// Lowercased extension of `file_name` without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// File name without its extension.
pub fn file_stem(file_name: &str) -> &str {
    let name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Canonical MIME type for an allowed extension.
pub fn content_type_for(extension: &str) -> Option<&'static str> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// A validated upload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub file_name: String,
    pub content_type: &'static str,
    /// The client's declared type differed from the canonical one.
    pub content_type_mismatch: bool,
}

/// Check name, size and type of a requested upload.
pub fn validate_upload(
    file_name: &str,
    size_bytes: i64,
    declared_content_type: Option<&str>,
) -> Result<ValidatedUpload, CoreError> {
    if size_bytes <= 0 {
        return Err(CoreError::Validation(
            "File size must be greater than zero".into(),
        ));
    }
    if size_bytes > MAX_DOCUMENT_SIZE_BYTES {
        return Err(CoreError::Validation(format!(
            "File size exceeds maximum allowed size of {} MB",
            MAX_DOCUMENT_SIZE_BYTES / 1024 / 1024
        )));
    }

    let file_name = file_name.trim();
    if file_name.is_empty() {
        return Err(CoreError::Validation("Filename is required".into()));
    }

    let content_type = extension_of(file_name)
        .as_deref()
        .and_then(content_type_for)
        .ok_or_else(|| {
            let allowed: Vec<&str> = MIME_TYPES.iter().map(|(e, _)| *e).collect();
            CoreError::Validation(format!(
                "File type is not allowed. Allowed types: {}",
                allowed.join(", ")
            ))
        })?;

    let content_type_mismatch = declared_content_type
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .is_some_and(|d| !d.eq_ignore_ascii_case(content_type));

    Ok(ValidatedUpload {
        file_name: file_name.to_string(),
        content_type,
        content_type_mismatch,
    })
}

/// Replace path separators and control characters, then cap the length.
pub fn sanitize_file_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.chars().count() <= MAX_STORED_FILE_NAME_LENGTH {
        return cleaned;
    }
    let ext = extension_of(&cleaned)
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let keep = MAX_STORED_FILE_NAME_LENGTH.saturating_sub(ext.chars().count());
    let stem: String = file_stem(&cleaned).chars().take(keep).collect();
    format!("{stem}{ext}")
}

/// Storage key for a document's bytes.
pub fn blob_path(world_id: DbId, document_id: DbId, file_name: &str) -> String {
    format!(
        "worlds/{world_id}/documents/{document_id}/{}",
        sanitize_file_name(file_name)
    )
}

/// The file stem, or the first free `stem (n)` among `existing` titles.
pub fn unique_title<S: AsRef<str>>(file_name: &str, existing: &[S]) -> Result<String, CoreError> {
    let base = file_stem(file_name.trim());
    let taken = |t: &str| existing.iter().any(|e| e.as_ref() == t);
    if !taken(base) {
        return Ok(base.to_string());
    }
    (2..=MAX_TITLE_SUFFIX)
        .map(|n| format!("{base} ({n})"))
        .find(|candidate| !taken(candidate))
        .ok_or_else(|| CoreError::Conflict("Too many documents with similar names".into()))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn accepts_known_types() {
        let upload = validate_upload("Map.PNG", 1024, Some("image/png")).unwrap();
        assert_eq!(upload.content_type, "image/png");
        assert!(!upload.content_type_mismatch);
    }

    #[test]
    fn flags_declared_type_mismatch() {
        let upload = validate_upload("notes.md", 10, Some("text/plain")).unwrap();
        assert_eq!(upload.content_type, "text/markdown");
        assert!(upload.content_type_mismatch);
    }

    #[test]
    fn rejects_bad_uploads() {
        assert_matches!(validate_upload("a.pdf", 0, None), Err(CoreError::Validation(_)));
        assert_matches!(
            validate_upload("a.pdf", MAX_DOCUMENT_SIZE_BYTES + 1, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(validate_upload("  ", 10, None), Err(CoreError::Validation(_)));
        assert_matches!(validate_upload("run.exe", 10, None), Err(CoreError::Validation(_)));
        assert_matches!(validate_upload("README", 10, None), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blob_paths_are_sanitized() {
        let world = DbId::from_u128(1);
        let doc = DbId::from_u128(2);
        let path = blob_path(world, doc, "../evil:name.pdf");
        assert_eq!(path, format!("worlds/{world}/documents/{doc}/.._evil_name.pdf"));
    }

    #[test]
    fn long_names_keep_extension() {
        let name = format!("{}.pdf", "a".repeat(300));
        let sanitized = sanitize_file_name(&name);
        assert_eq!(sanitized.chars().count(), MAX_STORED_FILE_NAME_LENGTH);
        assert!(sanitized.ends_with(".pdf"));
    }

    #[test]
    fn titles_get_numeric_suffixes() {
        let none: [&str; 0] = [];
        assert_eq!(unique_title("Handout.pdf", &none).unwrap(), "Handout");
        assert_eq!(
            unique_title("Handout.pdf", &["Handout", "Handout (2)"]).unwrap(),
            "Handout (3)"
        );
    }
}
