//! Note model: one entry in a release's notes.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Classification of a release note.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoteType {
    NewFeature,
    BugFix,
    KnownIssues,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::NewFeature => "NEW_FEATURE",
            NoteType::BugFix => "BUG_FIX",
            NoteType::KnownIssues => "KNOWN_ISSUES",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "NEW_FEATURE" => Some(NoteType::NewFeature),
            "BUG_FIX" => Some(NoteType::BugFix),
            "KNOWN_ISSUES" => Some(NoteType::KnownIssues),
            _ => None,
        }
    }
}

/// Parse a note type name, reporting unknown values as a validation error.
pub fn parse_note_type(raw: &str) -> Result<NoteType, AppError> {
    NoteType::from_str(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "noteType must be one of NEW_FEATURE, BUG_FIX, KNOWN_ISSUES (got {:?})",
            raw
        ))
    })
}

/// A note attached to a release, optionally scoped to one audience.
///
/// At most one note exists per (release, note type, audience).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub uuid: String,
    pub note_type: NoteType,
    pub release_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience_id: Option<i64>,
    pub description: String,
    /// Lower values are listed first.
    pub order: i64,
    pub created_at: String,
    pub updated_at: String,
    pub deleted: bool,
}

/// Request body for creating a new note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub release_id: i64,
    pub note_type: String,
    #[serde(default)]
    pub audience_id: Option<i64>,
    pub description: String,
    #[serde(default)]
    pub order: i64,
}

/// Request body for updating an existing note.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub note_type: Option<String>,
    /// `Some(None)` (JSON `null`) removes the audience scope.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub audience_id: Option<Option<i64>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: Option<i64>,
}

/// Distinguish an explicit `null` from an absent field.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
