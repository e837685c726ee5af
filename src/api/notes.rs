//! Note API endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use super::{success, ApiResult};
use crate::models::{CreateNoteRequest, Note, NoteFilter, UpdateNoteRequest};
use crate::AppState;

/// GET /api/notes - List notes.
pub async fn list_notes(
    State(state): State<AppState>,
    filter: Result<Query<NoteFilter>, QueryRejection>,
) -> ApiResult<Vec<Note>> {
    let Query(filter) = filter?;
    success(state.repo.admin_list_notes(&filter).await?)
}

/// GET /api/notes/:id - Get a single note.
pub async fn get_note(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Note> {
    success(state.repo.note_by_id(id).await?)
}

/// POST /api/notes - Create a new note.
pub async fn create_note(
    State(state): State<AppState>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> ApiResult<Note> {
    let Json(request) = payload?;
    success(state.repo.create_note(&request).await?)
}

/// PUT /api/notes/:id - Update a note.
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> ApiResult<Note> {
    let Json(request) = payload?;
    success(state.repo.update_note(id, &request).await?)
}

/// DELETE /api/notes/:id - Soft-delete a note.
pub async fn delete_note(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_note(id).await?;
    success(())
}
