//! Translation model: a per-language override of a note's description.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: i64,
    pub uuid: String,
    pub note_id: i64,
    /// Lowercase language code such as `de` or `pt-br`.
    pub language: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted: bool,
}

/// Request body for creating a new translation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTranslationRequest {
    pub note_id: i64,
    /// Defaults to the configured default language.
    #[serde(default)]
    pub language: Option<String>,
    pub description: String,
}

/// Request body for updating an existing translation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTranslationRequest {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Normalize a language code: trimmed, lowercase, `_` replaced by `-`.
pub fn normalize_language(code: &str) -> String {
    code.trim().to_lowercase().replace('_', "-")
}
