//! Project model: the product a set of release notes belongs to.

use serde::{Deserialize, Serialize};

/// A project published on one site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub uuid: String,
    pub name: String,
    pub site_id: i64,
    /// Derived from `name`, unique per site.
    pub slug: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub deleted: bool,
}

/// Request body for creating a new project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    /// Defaults to the site of the request.
    #[serde(default)]
    pub site_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for updating an existing project.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}
