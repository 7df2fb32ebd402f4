use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::core::error::{AppError, Result};

lazy_static! {
    /// Characters that are not safe in object-storage keys
    /// - Kept: ASCII letters, digits, '.', '_' and '-'
    /// - Replaced: spaces, slashes, brackets, non-ASCII, ...
    pub static ref UNSAFE_KEY_CHARS_REGEX: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();

    /// Regex for gateway/platform identifiers used as path segments
    /// - Valid: "db_1", "0190a6f2-7c1e-7a51-9a55-3b1fd1a2c4e0", "user123"
    /// - Invalid: "", "a/b", "id with space", "../etc"
    pub static ref IDENTIFIER_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// Rejects empty and whitespace-only strings
pub fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Ensure `value` is a usable identifier before it is sent anywhere.
///
/// Foreign keys and path segments go through here so that a mutation or
/// request with an empty id never leaves the process.
pub fn require_identifier(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if !IDENTIFIER_REGEX.is_match(value) {
        return Err(AppError::Validation(format!(
            "{} contains invalid characters",
            field
        )));
    }
    Ok(())
}
