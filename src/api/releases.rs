//! Release API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{success, ApiResult};
use crate::models::{CreateReleaseRequest, Release, ReleaseFilter, UpdateReleaseRequest};
use crate::AppState;

/// GET /api/releases - List releases.
pub async fn list_releases(
    State(state): State<AppState>,
    filter: Result<Query<ReleaseFilter>, QueryRejection>,
) -> ApiResult<Vec<Release>> {
    let Query(filter) = filter?;
    success(state.repo.admin_list_releases(&filter).await?)
}

/// GET /api/releases/:id - Get a single release.
pub async fn get_release(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Release> {
    success(state.repo.release_by_id(id).await?)
}

/// POST /api/releases - Create a new release.
pub async fn create_release(
    State(state): State<AppState>,
    payload: Result<Json<CreateReleaseRequest>, JsonRejection>,
) -> ApiResult<Release> {
    let Json(request) = payload?;
    success(state.repo.create_release(&request).await?)
}

/// PUT /api/releases/:id - Update a release.
pub async fn update_release(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateReleaseRequest>, JsonRejection>,
) -> ApiResult<Release> {
    let Json(request) = payload?;
    success(state.repo.update_release(id, &request).await?)
}

/// DELETE /api/releases/:id - Soft-delete a release.
pub async fn delete_release(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_release(id).await?;
    success(())
}
