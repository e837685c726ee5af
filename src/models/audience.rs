//! Audience model.

use serde::{Deserialize, Serialize};

/// A named group of readers a note can be restricted to.
///
/// `permission` is an opaque reference handed to the external permission service;
/// it is never evaluated here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Audience {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub project_id: i64,
    /// Derived from `name`, unique per project.
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
}

/// Request body for creating a new audience.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAudienceRequest {
    pub name: String,
    pub project_id: i64,
    #[serde(default)]
    pub permission: Option<String>,
}

/// Request body for updating an existing audience.
///
/// An empty `permission` string clears the reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAudienceRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub permission: Option<String>,
}
