//! Release model and its lifecycle state.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::slug;

/// Lifecycle stage of a release relative to its project's timeline.
///
/// Transitions are plain operator writes; nothing moves a release between states
/// automatically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReleaseState {
    #[default]
    Future,
    Current,
    Previous,
}

impl ReleaseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseState::Future => "FUTURE",
            ReleaseState::Current => "CURRENT",
            ReleaseState::Previous => "PREVIOUS",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "FUTURE" => Some(ReleaseState::Future),
            "CURRENT" => Some(ReleaseState::Current),
            "PREVIOUS" => Some(ReleaseState::Previous),
            _ => None,
        }
    }
}

/// Parse a state name, reporting unknown values as a validation error.
pub fn parse_state(raw: &str) -> Result<ReleaseState, AppError> {
    ReleaseState::from_str(raw).ok_or_else(|| {
        AppError::Validation(format!(
            "state must be one of FUTURE, CURRENT, PREVIOUS (got {:?})",
            raw
        ))
    })
}

/// A versioned release of a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: i64,
    pub uuid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub project_id: i64,
    /// Derived from `version_name`, unique per project.
    pub slug: String,
    pub major: i64,
    pub minor: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    pub state: ReleaseState,
    pub version_number: String,
    pub version_name: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted: bool,
}

/// Version components of a release, before any row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion<'a> {
    pub major: i64,
    pub minor: i64,
    pub patch: Option<&'a str>,
    pub name: Option<&'a str>,
}

impl ReleaseVersion<'_> {
    pub fn version_number(&self) -> String {
        slug::version_number(self.major, self.minor, self.patch)
    }

    pub fn version_name(&self) -> String {
        slug::version_name(&self.version_number(), self.name)
    }

    pub fn slug(&self) -> String {
        slug::release_slug(&self.version_name())
    }
}

/// Request body for creating a new release.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReleaseRequest {
    pub project_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub major: i64,
    pub minor: i64,
    #[serde(default)]
    pub patch: Option<String>,
    /// Defaults to `FUTURE`.
    #[serde(default)]
    pub state: Option<String>,
}

/// Request body for updating an existing release.
///
/// Empty `name` or `patch` strings clear the field.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReleaseRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub major: Option<i64>,
    #[serde(default)]
    pub minor: Option<i64>,
    #[serde(default)]
    pub patch: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}
