//! Input validation helpers
//!
//! Centralized text length constants and validation functions shared by the
//! CRUD handlers and the order workflow. Storage is schemaless, so every
//! rule lives here.

use crate::utils::AppError;
use shared::error::ErrorCode;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product title, category, customer name
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, testimonial comments
pub const MAX_NOTE_LEN: usize = 2000;

/// Short identifiers: phone, city, size, color
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Upper bound for id lists in batch lookups
pub const MAX_BATCH_IDS: usize = 500;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
///
/// Returns the trimmed value.
pub fn validate_required_text(
    value: Option<&str>,
    field: &str,
    max_len: usize,
) -> Result<String, AppError> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(
            AppError::with_message(ErrorCode::RequiredField, format!("{field} is required"))
                .with_detail("field", field),
        );
    }
    check_len(trimmed, field, max_len)?;
    Ok(trimmed.to_string())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value {
        check_len(v, field, max_len)?;
    }
    Ok(())
}

/// Validate a batch id list: must be present and non-empty
pub fn validate_id_list(ids: Option<Vec<String>>) -> Result<Vec<String>, AppError> {
    let ids = ids.unwrap_or_default();
    if ids.is_empty() {
        return Err(AppError::validation("ids must be a non-empty array"));
    }
    if ids.len() > MAX_BATCH_IDS {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("too many ids ({}, max {MAX_BATCH_IDS})", ids.len()),
        ));
    }
    Ok(ids)
}

fn check_len(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    let len = value.chars().count();
    if len > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({len} chars, max {max_len})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        let name = validate_required_text(Some("  Winter  "), "name", MAX_NAME_LEN).unwrap();
        assert_eq!(name, "Winter");
    }

    #[test]
    fn test_required_text_rejects_blank() {
        let err = validate_required_text(Some("   "), "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
        let err = validate_required_text(None, "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_length_limit() {
        let long = "x".repeat(MAX_SHORT_TEXT_LEN + 1);
        assert!(validate_required_text(Some(&long), "phone", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_optional_text(&Some(long), "phone", MAX_SHORT_TEXT_LEN).is_err());
        assert!(validate_optional_text(&None, "phone", MAX_SHORT_TEXT_LEN).is_ok());
    }

    #[test]
    fn test_id_list() {
        assert!(validate_id_list(None).is_err());
        assert!(validate_id_list(Some(vec![])).is_err());
        assert_eq!(
            validate_id_list(Some(vec!["a".into()])).unwrap(),
            vec!["a".to_string()]
        );
    }
}
