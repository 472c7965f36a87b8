//! Input validation helpers
//!
//! Text length limits plus conversion of `validator` reports into
//! [`AppError`]. SQLite TEXT has no built-in length enforcement.

use validator::{ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Submitter and display names
pub const MAX_NAME_LEN: usize = 200;

/// Ticket descriptions
pub const MAX_NOTE_LEN: usize = 2000;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Officer names
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Helpers ─────────────────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::required(field));
    }
    if value.chars().count() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.chars().count()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Convert a `validator` report into an API error.
///
/// A single empty field maps to `RequiredField`; anything else is
/// `ValidationFailed` with one detail entry per offending field.
pub fn from_validation_errors(errors: &ValidationErrors) -> AppError {
    let mut fields: Vec<(&str, String)> = errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(list) => list.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.as_ref(), message)
            }),
            _ => None,
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    if let [(field, _)] = fields.as_slice() {
        let only_length = errors
            .field_errors()
            .get(*field)
            .is_some_and(|list| list.iter().all(|e| e.code == "length"));
        if only_length {
            return AppError::required(field);
        }
    }

    let summary = fields
        .iter()
        .map(|(field, _)| *field)
        .collect::<Vec<_>>()
        .join(", ");
    fields.into_iter().fold(
        AppError::validation(format!("Invalid fields: {}", summary)),
        |err, (field, message)| err.with_detail(field, message),
    )
}
