//! Data models for the release notes service.
//!
//! Entities serialize with camelCase field names. Request bodies carry their own
//! validation so handlers and the repository agree on what a valid write is.

mod audience;
mod filters;
mod note;
mod project;
mod release;
mod translation;
mod view;

pub use audience::*;
pub use filters::*;
pub use note::*;
pub use project::*;
pub use release::*;
pub use translation::*;
pub use view::*;

use crate::errors::AppError;

/// Maximum length of names and short labels.
pub const NAME_MAX_LEN: usize = 80;
/// Maximum length of a release patch label.
pub const PATCH_MAX_LEN: usize = 50;
/// Maximum length of a language code.
pub const LANGUAGE_MAX_LEN: usize = 15;

/// Trim `value` and reject it when blank or longer than `max_len` characters.
pub(crate) fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    check_len(field, trimmed, max_len)?;
    Ok(trimmed.to_string())
}

/// Trim `value`, mapping blank text to `None`.
pub(crate) fn optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<Option<String>, AppError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => {
            check_len(field, v, max_len)?;
            Ok(Some(v.to_string()))
        }
        None => Ok(None),
    }
}

fn check_len(field: &str, value: &str, max_len: usize) -> Result<(), AppError> {
    if value.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}
