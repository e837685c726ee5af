//! Audience persistence.
//!
//! Audiences carry no timestamps and no deleted flag; they are never removed here.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite};

use super::projects::{fetch_project, name_slug};
use super::repository::{new_uuid, push_search, Repository};
use crate::errors::AppError;
use crate::models::{
    optional_text, required_text, Audience, AudienceFilter, CreateAudienceRequest,
    UpdateAudienceRequest, NAME_MAX_LEN,
};

const AUDIENCE_COLUMNS: &str = "id, uuid, name, project_id, slug, permission";

/// Maximum length of a permission reference.
const PERMISSION_MAX_LEN: usize = 255;

impl Repository {
    /// Look up an audience by slug within a project.
    pub async fn get_audience(&self, project_id: i64, slug: &str) -> Result<Audience, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM audiences WHERE project_id = ? AND slug = ?",
            AUDIENCE_COLUMNS
        ))
        .bind(project_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(audience_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Audience {} not found", slug)))
    }

    /// List audiences for the admin surface.
    pub async fn admin_list_audiences(
        &self,
        filter: &AudienceFilter,
    ) -> Result<Vec<Audience>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM audiences WHERE 1 = 1",
            AUDIENCE_COLUMNS
        ));
        if let Some(project_id) = filter.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(permission) = filter.permission.as_deref() {
            qb.push(" AND permission = ").push_bind(permission.trim().to_string());
        }
        push_search(&mut qb, "name", filter.q.as_deref());
        qb.push(" ORDER BY project_id, name, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(audience_from_row).collect())
    }

    pub async fn audience_by_id(&self, id: i64) -> Result<Audience, AppError> {
        fetch_audience(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audience {} not found", id)))
    }

    pub async fn create_audience(
        &self,
        request: &CreateAudienceRequest,
    ) -> Result<Audience, AppError> {
        let name = required_text("name", &request.name, NAME_MAX_LEN)?;
        let slug = name_slug(&name)?;
        let permission =
            optional_text("permission", request.permission.as_deref(), PERMISSION_MAX_LEN)?;

        let mut tx = self.begin_write().await?;

        if fetch_project(&mut *tx, request.project_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Project {} does not exist",
                request.project_id
            )));
        }

        let result = sqlx::query(
            "INSERT INTO audiences (uuid, name, project_id, slug, permission) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(new_uuid())
        .bind(&name)
        .bind(request.project_id)
        .bind(&slug)
        .bind(&permission)
        .execute(&mut *tx)
        .await?;

        let audience = fetch_audience(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Inserted audience vanished".to_string()))?;
        tx.commit().await?;

        tracing::info!(
            "Created audience {} ({}) for project {}",
            audience.id,
            audience.slug,
            audience.project_id
        );
        Ok(audience)
    }

    pub async fn update_audience(
        &self,
        id: i64,
        request: &UpdateAudienceRequest,
    ) -> Result<Audience, AppError> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_audience(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audience {} not found", id)))?;

        let name = match &request.name {
            Some(name) => required_text("name", name, NAME_MAX_LEN)?,
            None => existing.name.clone(),
        };
        let slug = self.slug_policy.resolve(&existing.slug, name_slug(&name)?);
        let permission = match &request.permission {
            Some(permission) => {
                optional_text("permission", Some(permission.as_str()), PERMISSION_MAX_LEN)?
            }
            None => existing.permission.clone(),
        };

        sqlx::query("UPDATE audiences SET name = ?, slug = ?, permission = ? WHERE id = ?")
            .bind(&name)
            .bind(&slug)
            .bind(&permission)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let audience = fetch_audience(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audience {} not found", id)))?;
        tx.commit().await?;

        Ok(audience)
    }
}

/// All audiences of a project, by name.
pub(super) async fn project_audiences<'e, E>(
    executor: E,
    project_id: i64,
) -> Result<Vec<Audience>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query(&format!(
        "SELECT {} FROM audiences WHERE project_id = ? ORDER BY name, id",
        AUDIENCE_COLUMNS
    ))
    .bind(project_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.iter().map(audience_from_row).collect())
}

pub(super) async fn fetch_audience<'e, E>(
    executor: E,
    id: i64,
) -> Result<Option<Audience>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        "SELECT {} FROM audiences WHERE id = ?",
        AUDIENCE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(audience_from_row))
}

fn audience_from_row(row: &SqliteRow) -> Audience {
    Audience {
        id: row.get("id"),
        uuid: row.get("uuid"),
        name: row.get("name"),
        project_id: row.get("project_id"),
        slug: row.get("slug"),
        permission: row.get("permission"),
    }
}
