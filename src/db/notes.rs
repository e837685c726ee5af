//! Note persistence and the release notes view.

use std::collections::HashMap;

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite, SqliteConnection};

use super::audiences::{fetch_audience, project_audiences};
use super::releases::fetch_release;
use super::repository::{new_uuid, push_date_bounds, push_deleted, Repository};
use super::translations::translation_from_row;
use crate::errors::AppError;
use crate::models::{
    now_timestamp, parse_note_type, Audience, CreateNoteRequest, Note, NoteFilter, NoteType, NoteView, Project,
    Release, ReleaseNotesView, Translation, UpdateNoteRequest,
};

const NOTE_COLUMNS: &str = "id, uuid, note_type, release_id, audience_id, description, sort_order, created_at, updated_at, deleted";

impl Repository {
    // ==================== PUBLIC READS ====================

    /// Build the notes page of a release.
    ///
    /// With `audience`, only that audience's notes and unscoped notes are kept.
    /// `language` selects translated descriptions. All rows come from one read
    /// transaction, so notes, audiences and translations share a snapshot.
    pub async fn release_notes_view(
        &self,
        project: Project,
        release: Release,
        audience: Option<&Audience>,
        language: Option<&str>,
    ) -> Result<ReleaseNotesView, AppError> {
        let mut tx = self.pool.begin().await?;

        let notes = release_notes(&mut *tx, release.id).await?;

        let audiences: HashMap<i64, Audience> = project_audiences(&mut *tx, project.id)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut translations: HashMap<i64, Vec<Translation>> = HashMap::new();
        let rows = sqlx::query(
            r#"SELECT t.id, t.uuid, t.note_id, t.language, t.description, t.created_at, t.updated_at, t.deleted
               FROM translations t
               JOIN notes n ON n.id = t.note_id
               WHERE n.release_id = ? AND t.deleted = 0
               ORDER BY t.language, t.id"#,
        )
        .bind(release.id)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;

        for translation in rows.iter().map(translation_from_row) {
            translations
                .entry(translation.note_id)
                .or_default()
                .push(translation);
        }

        let views = notes
            .into_iter()
            .filter(|note| match (audience, note.audience_id) {
                (Some(wanted), Some(scoped)) => wanted.id == scoped,
                _ => true,
            })
            .map(|note| {
                let note_audience = note.audience_id.and_then(|id| audiences.get(&id).cloned());
                let note_translations = translations.remove(&note.id).unwrap_or_default();
                NoteView::new(note, note_audience, note_translations, language)
            })
            .collect();

        Ok(ReleaseNotesView::partition(project, release, views))
    }

    // ==================== ADMIN ====================

    /// List notes for the admin surface.
    pub async fn admin_list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, AppError> {
        let note_type = filter.note_type.as_deref().map(parse_note_type).transpose()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM notes WHERE 1 = 1",
            NOTE_COLUMNS
        ));
        if let Some(release_id) = filter.release_id {
            qb.push(" AND release_id = ").push_bind(release_id);
        }
        if let Some(note_type) = note_type {
            qb.push(" AND note_type = ").push_bind(note_type.as_str());
        }
        if let Some(audience_id) = filter.audience_id {
            qb.push(" AND audience_id = ").push_bind(audience_id);
        }
        push_deleted(&mut qb, filter.deleted);
        push_date_bounds(
            &mut qb,
            filter.created_since.as_deref(),
            filter.updated_since.as_deref(),
        )?;
        qb.push(" ORDER BY release_id, note_type, sort_order, created_at, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(note_from_row).collect())
    }

    pub async fn note_by_id(&self, id: i64) -> Result<Note, AppError> {
        fetch_note(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Note {} not found", id)))
    }

    /// Create a note. A second note with the same (release, type, audience) is a
    /// constraint violation.
    pub async fn create_note(&self, request: &CreateNoteRequest) -> Result<Note, AppError> {
        let note_type = parse_note_type(&request.note_type)?;
        let description = required_description(&request.description)?;
        let now = now_timestamp();

        let mut tx = self.begin_write().await?;

        check_note_parents(&mut tx, request.release_id, request.audience_id).await?;

        let result = sqlx::query(
            "INSERT INTO notes (uuid, note_type, release_id, audience_id, description, sort_order, created_at, updated_at, deleted) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(new_uuid())
        .bind(note_type.as_str())
        .bind(request.release_id)
        .bind(request.audience_id)
        .bind(&description)
        .bind(request.order)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let note = fetch_note(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Inserted note vanished".to_string()))?;
        tx.commit().await?;

        tracing::info!(
            "Created {} note {} for release {}",
            note.note_type.as_str(),
            note.id,
            note.release_id
        );
        Ok(note)
    }

    pub async fn update_note(&self, id: i64, request: &UpdateNoteRequest) -> Result<Note, AppError> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_note(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Note {} not found", id)))?;

        let note_type = match request.note_type.as_deref() {
            Some(raw) => parse_note_type(raw)?,
            None => existing.note_type,
        };
        let audience_id = match request.audience_id {
            Some(audience_id) => audience_id,
            None => existing.audience_id,
        };
        let description = match request.description.as_deref() {
            Some(raw) => required_description(raw)?,
            None => existing.description.clone(),
        };
        let order = request.order.unwrap_or(existing.order);

        if audience_id != existing.audience_id {
            check_note_parents(&mut tx, existing.release_id, audience_id).await?;
        }

        sqlx::query(
            "UPDATE notes SET note_type = ?, audience_id = ?, description = ?, sort_order = ?, updated_at = ? WHERE id = ?",
        )
        .bind(note_type.as_str())
        .bind(audience_id)
        .bind(&description)
        .bind(order)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let note = fetch_note(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Note {} not found", id)))?;
        tx.commit().await?;

        Ok(note)
    }

    /// Flag a note as deleted.
    ///
    /// The row still occupies its (release, type, audience) slot.
    pub async fn delete_note(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE notes SET deleted = 1, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Note {} not found", id)));
        }

        tracing::info!("Soft-deleted note {}", id);
        Ok(())
    }
}

fn required_description(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    Ok(trimmed.to_string())
}

/// The release must exist, and an audience must belong to the release's project.
async fn check_note_parents(
    conn: &mut SqliteConnection,
    release_id: i64,
    audience_id: Option<i64>,
) -> Result<(), AppError> {
    let release = fetch_release(&mut *conn, release_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Release {} does not exist", release_id)))?;

    if let Some(audience_id) = audience_id {
        let audience = fetch_audience(&mut *conn, audience_id)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!("Audience {} does not exist", audience_id))
            })?;
        if audience.project_id != release.project_id {
            return Err(AppError::Validation(format!(
                "Audience {} belongs to another project",
                audience_id
            )));
        }
    }
    Ok(())
}

/// Live notes of a release in display order.
async fn release_notes<'e, E>(executor: E, release_id: i64) -> Result<Vec<Note>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(&format!(
        "SELECT {} FROM notes WHERE release_id = ? AND deleted = 0 ORDER BY sort_order, created_at, id",
        NOTE_COLUMNS
    ))
    .bind(release_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.iter().map(note_from_row).collect())
}

pub(super) async fn fetch_note<'e, E>(executor: E, id: i64) -> Result<Option<Note>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!("SELECT {} FROM notes WHERE id = ?", NOTE_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(row.as_ref().map(note_from_row))
}

fn note_from_row(row: &SqliteRow) -> Note {
    let deleted: i32 = row.get("deleted");
    let note_type: String = row.get("note_type");
    Note {
        id: row.get("id"),
        uuid: row.get("uuid"),
        note_type: NoteType::from_str(&note_type).unwrap_or(NoteType::NewFeature),
        release_id: row.get("release_id"),
        audience_id: row.get("audience_id"),
        description: row.get("description"),
        order: row.get("sort_order"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted: deleted != 0,
    }
}
