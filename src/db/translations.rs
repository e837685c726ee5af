//! Translation persistence.
//!
//! Several live translations may share a (note, language) pair; readers pick the
//! most recently updated one.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite};

use super::notes::fetch_note;
use super::repository::{new_uuid, push_deleted, Repository};
use crate::errors::AppError;
use crate::models::{
    normalize_language, now_timestamp, CreateTranslationRequest, Translation, TranslationFilter,
    UpdateTranslationRequest, LANGUAGE_MAX_LEN,
};

const TRANSLATION_COLUMNS: &str =
    "id, uuid, note_id, language, description, created_at, updated_at, deleted";

impl Repository {
    /// List translations for the admin surface.
    pub async fn admin_list_translations(
        &self,
        filter: &TranslationFilter,
    ) -> Result<Vec<Translation>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM translations WHERE 1 = 1",
            TRANSLATION_COLUMNS
        ));
        if let Some(note_id) = filter.note_id {
            qb.push(" AND note_id = ").push_bind(note_id);
        }
        if let Some(language) = filter.language.as_deref() {
            qb.push(" AND language = ").push_bind(normalize_language(language));
        }
        push_deleted(&mut qb, filter.deleted);
        qb.push(" ORDER BY note_id, language, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(translation_from_row).collect())
    }

    pub async fn translation_by_id(&self, id: i64) -> Result<Translation, AppError> {
        fetch_translation(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Translation {} not found", id)))
    }

    /// Create a translation; a request without language gets `default_language`.
    pub async fn create_translation(
        &self,
        default_language: &str,
        request: &CreateTranslationRequest,
    ) -> Result<Translation, AppError> {
        let language = language_code(request.language.as_deref().unwrap_or(default_language))?;
        let description = translated_text(&request.description)?;
        let now = now_timestamp();

        let mut tx = self.begin_write().await?;

        if fetch_note(&mut *tx, request.note_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Note {} does not exist",
                request.note_id
            )));
        }

        let result = sqlx::query(
            "INSERT INTO translations (uuid, note_id, language, description, created_at, updated_at, deleted) VALUES (?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(new_uuid())
        .bind(request.note_id)
        .bind(&language)
        .bind(&description)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let translation = fetch_translation(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Inserted translation vanished".to_string()))?;
        tx.commit().await?;

        tracing::info!(
            "Created {} translation {} for note {}",
            translation.language,
            translation.id,
            translation.note_id
        );
        Ok(translation)
    }

    pub async fn update_translation(
        &self,
        id: i64,
        request: &UpdateTranslationRequest,
    ) -> Result<Translation, AppError> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_translation(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Translation {} not found", id)))?;

        let language = match request.language.as_deref() {
            Some(raw) => language_code(raw)?,
            None => existing.language.clone(),
        };
        let description = match request.description.as_deref() {
            Some(raw) => translated_text(raw)?,
            None => existing.description.clone(),
        };

        sqlx::query(
            "UPDATE translations SET language = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&language)
        .bind(&description)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let translation = fetch_translation(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Translation {} not found", id)))?;
        tx.commit().await?;

        Ok(translation)
    }

    pub async fn delete_translation(&self, id: i64) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE translations SET deleted = 1, updated_at = ? WHERE id = ?")
                .bind(now_timestamp())
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Translation {} not found", id)));
        }

        tracing::info!("Soft-deleted translation {}", id);
        Ok(())
    }
}

fn language_code(raw: &str) -> Result<String, AppError> {
    let code = normalize_language(raw);
    let well_formed = !code.is_empty()
        && code.chars().count() <= LANGUAGE_MAX_LEN
        && code
            .split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
    if !well_formed {
        return Err(AppError::Validation(format!(
            "language {:?} is not a valid language code",
            raw
        )));
    }
    Ok(code)
}

fn translated_text(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    Ok(trimmed.to_string())
}

async fn fetch_translation<'e, E>(executor: E, id: i64) -> Result<Option<Translation>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        "SELECT {} FROM translations WHERE id = ?",
        TRANSLATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(translation_from_row))
}

pub(super) fn translation_from_row(row: &SqliteRow) -> Translation {
    let deleted: i32 = row.get("deleted");
    Translation {
        id: row.get("id"),
        uuid: row.get("uuid"),
        note_id: row.get("note_id"),
        language: row.get("language"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted: deleted != 0,
    }
}
