//! Query parameters for list endpoints and public views.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::errors::AppError;

/// Current time in the fixed-width format stored in every timestamp column.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a `createdSince`/`updatedSince` bound.
///
/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC) and
/// returns it in the stored timestamp format so it compares as text.
pub fn parse_since(field: &str, raw: &str) -> Result<String, AppError> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(format_timestamp(at.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(format_timestamp(midnight.and_utc()));
        }
    }
    Err(AppError::Validation(format!(
        "{} must be an RFC 3339 timestamp or YYYY-MM-DD date",
        field
    )))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFilter {
    /// Case-insensitive name search.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub site_id: Option<i64>,
    #[serde(default)]
    pub created_since: Option<String>,
    #[serde(default)]
    pub updated_since: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub created_since: Option<String>,
    #[serde(default)]
    pub updated_since: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub permission: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    #[serde(default)]
    pub deleted: Option<bool>,
    #[serde(default)]
    pub release_id: Option<i64>,
    #[serde(default)]
    pub note_type: Option<String>,
    #[serde(default)]
    pub audience_id: Option<i64>,
    #[serde(default)]
    pub created_since: Option<String>,
    #[serde(default)]
    pub updated_since: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationFilter {
    #[serde(default)]
    pub note_id: Option<i64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub deleted: Option<bool>,
}

/// Query parameters of the public project page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectViewQuery {
    /// Only list releases in this state.
    #[serde(default)]
    pub state: Option<String>,
}

/// Query parameters of the public release page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseViewQuery {
    /// Audience slug; keeps that audience's notes plus unscoped ones.
    #[serde(default)]
    pub audience: Option<String>,
    /// Language used to pick note translations.
    #[serde(default)]
    pub lang: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_since_accepts_dates_and_timestamps() {
        assert_eq!(
            parse_since("createdSince", "2024-03-01").unwrap(),
            "2024-03-01T00:00:00.000000Z"
        );
        assert_eq!(
            parse_since("createdSince", "2024-03-01T12:30:00+02:00").unwrap(),
            "2024-03-01T10:30:00.000000Z"
        );
        assert!(matches!(
            parse_since("createdSince", "last week"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = parse_since("t", "2024-03-01T10:00:00Z").unwrap();
        let later = parse_since("t", "2024-03-01T10:00:00.5Z").unwrap();
        assert!(earlier < later);
        assert!(now_timestamp() > later);
    }
}
