//! Translation API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{success, ApiResult};
use crate::models::{
    CreateTranslationRequest, Translation, TranslationFilter, UpdateTranslationRequest,
};
use crate::AppState;

/// GET /api/translations - List translations.
pub async fn list_translations(
    State(state): State<AppState>,
    filter: Result<Query<TranslationFilter>, QueryRejection>,
) -> ApiResult<Vec<Translation>> {
    let Query(filter) = filter?;
    success(state.repo.admin_list_translations(&filter).await?)
}

/// GET /api/translations/:id - Get a single translation.
pub async fn get_translation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Translation> {
    success(state.repo.translation_by_id(id).await?)
}

/// POST /api/translations - Create a translation; language defaults to the configured one.
pub async fn create_translation(
    State(state): State<AppState>,
    payload: Result<Json<CreateTranslationRequest>, JsonRejection>,
) -> ApiResult<Translation> {
    let Json(request) = payload?;
    let translation = state
        .repo
        .create_translation(&state.config.default_language, &request)
        .await?;
    success(translation)
}

/// PUT /api/translations/:id - Update a translation.
pub async fn update_translation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateTranslationRequest>, JsonRejection>,
) -> ApiResult<Translation> {
    let Json(request) = payload?;
    success(state.repo.update_translation(id, &request).await?)
}

/// DELETE /api/translations/:id - Soft-delete a translation.
pub async fn delete_translation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.repo.delete_translation(id).await?;
    success(())
}
