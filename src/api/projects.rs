//! Project API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{success, ApiResult, SiteId};
use crate::models::{CreateProjectRequest, Project, ProjectFilter, UpdateProjectRequest};
use crate::AppState;

/// GET /api/projects - List projects, deleted ones included unless filtered.
pub async fn list_projects(
    State(state): State<AppState>,
    filter: Result<Query<ProjectFilter>, QueryRejection>,
) -> ApiResult<Vec<Project>> {
    let Query(filter) = filter?;
    success(state.repo.admin_list_projects(&filter).await?)
}

/// GET /api/projects/:id - Get a single project.
pub async fn get_project(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Project> {
    success(state.repo.project_by_id(id).await?)
}

/// POST /api/projects - Create a new project on the request's site.
pub async fn create_project(
    State(state): State<AppState>,
    site: SiteId,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<Project> {
    let Json(request) = payload?;
    success(state.repo.create_project(site.0, &request).await?)
}

/// PUT /api/projects/:id - Update a project.
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<Project> {
    let Json(request) = payload?;
    success(state.repo.update_project(id, &request).await?)
}

/// DELETE /api/projects/:id - Soft-delete a project.
pub async fn delete_project(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_project(id).await?;
    success(())
}
