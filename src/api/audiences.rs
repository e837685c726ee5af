//! Audience API endpoints. Audiences are never deleted.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{success, ApiResult};
use crate::models::{Audience, AudienceFilter, CreateAudienceRequest, UpdateAudienceRequest};
use crate::AppState;

/// GET /api/audiences - List audiences.
pub async fn list_audiences(
    State(state): State<AppState>,
    filter: Result<Query<AudienceFilter>, QueryRejection>,
) -> ApiResult<Vec<Audience>> {
    let Query(filter) = filter?;
    success(state.repo.admin_list_audiences(&filter).await?)
}

/// GET /api/audiences/:id - Get a single audience.
pub async fn get_audience(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Audience> {
    success(state.repo.audience_by_id(id).await?)
}

/// POST /api/audiences - Create a new audience.
pub async fn create_audience(
    State(state): State<AppState>,
    payload: Result<Json<CreateAudienceRequest>, JsonRejection>,
) -> ApiResult<Audience> {
    let Json(request) = payload?;
    success(state.repo.create_audience(&request).await?)
}

/// PUT /api/audiences/:id - Update an audience.
pub async fn update_audience(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateAudienceRequest>, JsonRejection>,
) -> ApiResult<Audience> {
    let Json(request) = payload?;
    success(state.repo.update_audience(id, &request).await?)
}
