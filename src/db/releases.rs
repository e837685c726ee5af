//! Release persistence.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite};

use super::projects::fetch_project;
use super::repository::{new_uuid, push_date_bounds, push_deleted, push_search, Repository};
use crate::errors::AppError;
use crate::models::{
    now_timestamp, optional_text, parse_state, CreateReleaseRequest, Release, ReleaseFilter, ReleaseState,
    ReleaseVersion, UpdateReleaseRequest, NAME_MAX_LEN, PATCH_MAX_LEN,
};

const RELEASE_COLUMNS: &str = "r.id, r.uuid, r.name, r.project_id, r.slug, r.major, r.minor, r.patch, r.state, r.created_at, r.updated_at, r.deleted";

const NEWEST_FIRST: &str = " ORDER BY r.major DESC, r.minor DESC, r.created_at DESC, r.id DESC";

impl Repository {
    // ==================== PUBLIC READS ====================

    /// Look up a live release by slug inside a live project of the site.
    pub async fn get_release(
        &self,
        site_id: i64,
        project_slug: &str,
        release_slug: &str,
    ) -> Result<Release, AppError> {
        let row = sqlx::query(&format!(
            r#"SELECT {} FROM releases r
               JOIN projects p ON p.id = r.project_id
               WHERE p.site_id = ? AND p.slug = ? AND p.deleted = 0
                 AND r.slug = ? AND r.deleted = 0"#,
            RELEASE_COLUMNS
        ))
        .bind(site_id)
        .bind(project_slug)
        .bind(release_slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(release_from_row).ok_or_else(|| {
            AppError::NotFound(format!(
                "Release {} of project {} not found",
                release_slug, project_slug
            ))
        })
    }

    /// Live releases of a project, newest version first.
    pub async fn list_project_releases(
        &self,
        project_id: i64,
        state: Option<ReleaseState>,
    ) -> Result<Vec<Release>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM releases r WHERE r.deleted = 0 AND r.project_id = ",
            RELEASE_COLUMNS
        ));
        qb.push_bind(project_id);
        if let Some(state) = state {
            qb.push(" AND r.state = ").push_bind(state.as_str());
        }
        qb.push(NEWEST_FIRST);

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(release_from_row).collect())
    }

    // ==================== ADMIN ====================

    /// List releases for the admin surface, newest version first.
    pub async fn admin_list_releases(&self, filter: &ReleaseFilter) -> Result<Vec<Release>, AppError> {
        let state = filter.state.as_deref().map(parse_state).transpose()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM releases r WHERE 1 = 1",
            RELEASE_COLUMNS
        ));
        if let Some(project_id) = filter.project_id {
            qb.push(" AND r.project_id = ").push_bind(project_id);
        }
        if let Some(state) = state {
            qb.push(" AND r.state = ").push_bind(state.as_str());
        }
        push_deleted(&mut qb, filter.deleted);
        push_search(&mut qb, "r.name", filter.q.as_deref());
        push_date_bounds(
            &mut qb,
            filter.created_since.as_deref(),
            filter.updated_since.as_deref(),
        )?;
        qb.push(NEWEST_FIRST);

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(release_from_row).collect())
    }

    /// Get a release by id, deleted or not.
    pub async fn release_by_id(&self, id: i64) -> Result<Release, AppError> {
        fetch_release(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Release {} not found", id)))
    }

    /// Create a release; the slug comes from its version label.
    pub async fn create_release(&self, request: &CreateReleaseRequest) -> Result<Release, AppError> {
        let name = optional_text("name", request.name.as_deref(), NAME_MAX_LEN)?;
        let patch = optional_text("patch", request.patch.as_deref(), PATCH_MAX_LEN)?;
        check_version_part("major", request.major)?;
        check_version_part("minor", request.minor)?;
        let state = match request.state.as_deref() {
            Some(raw) => parse_state(raw)?,
            None => ReleaseState::default(),
        };
        let slug = ReleaseVersion {
            major: request.major,
            minor: request.minor,
            patch: patch.as_deref(),
            name: name.as_deref(),
        }
        .slug();
        let now = now_timestamp();

        let mut tx = self.begin_write().await?;

        if fetch_project(&mut *tx, request.project_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Project {} does not exist",
                request.project_id
            )));
        }

        let result = sqlx::query(
            "INSERT INTO releases (uuid, name, project_id, slug, major, minor, patch, state, created_at, updated_at, deleted) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(new_uuid())
        .bind(&name)
        .bind(request.project_id)
        .bind(&slug)
        .bind(request.major)
        .bind(request.minor)
        .bind(&patch)
        .bind(state.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let release = fetch_release(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Inserted release vanished".to_string()))?;
        tx.commit().await?;

        tracing::info!(
            "Created release {} ({}) for project {}",
            release.id,
            release.slug,
            release.project_id
        );
        Ok(release)
    }

    /// Update a release, deriving its slug again per the slug policy.
    ///
    /// No check keeps a single `CURRENT` release per project.
    pub async fn update_release(
        &self,
        id: i64,
        request: &UpdateReleaseRequest,
    ) -> Result<Release, AppError> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_release(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Release {} not found", id)))?;

        let name = match &request.name {
            Some(name) => optional_text("name", Some(name.as_str()), NAME_MAX_LEN)?,
            None => existing.name.clone(),
        };
        let patch = match &request.patch {
            Some(patch) => optional_text("patch", Some(patch.as_str()), PATCH_MAX_LEN)?,
            None => existing.patch.clone(),
        };
        let major = request.major.unwrap_or(existing.major);
        let minor = request.minor.unwrap_or(existing.minor);
        check_version_part("major", major)?;
        check_version_part("minor", minor)?;
        let state = match request.state.as_deref() {
            Some(raw) => parse_state(raw)?,
            None => existing.state,
        };
        let derived = ReleaseVersion {
            major,
            minor,
            patch: patch.as_deref(),
            name: name.as_deref(),
        }
        .slug();
        let slug = self.slug_policy.resolve(&existing.slug, derived);

        sqlx::query(
            "UPDATE releases SET name = ?, slug = ?, major = ?, minor = ?, patch = ?, state = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(&slug)
        .bind(major)
        .bind(minor)
        .bind(&patch)
        .bind(state.as_str())
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let release = fetch_release(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Release {} not found", id)))?;
        tx.commit().await?;

        if release.state != existing.state {
            tracing::info!(
                "Release {} moved from {} to {}",
                id,
                existing.state.as_str(),
                release.state.as_str()
            );
        }
        Ok(release)
    }

    /// Flag a release as deleted.
    pub async fn delete_release(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE releases SET deleted = 1, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Release {} not found", id)));
        }

        tracing::info!("Soft-deleted release {}", id);
        Ok(())
    }
}

fn check_version_part(field: &str, value: i64) -> Result<(), AppError> {
    if value < 0 {
        return Err(AppError::Validation(format!(
            "{} must not be negative",
            field
        )));
    }
    Ok(())
}

pub(super) async fn fetch_release<'e, E>(executor: E, id: i64) -> Result<Option<Release>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        "SELECT {} FROM releases r WHERE r.id = ?",
        RELEASE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(release_from_row))
}

fn release_from_row(row: &SqliteRow) -> Release {
    let deleted: i32 = row.get("deleted");
    let state: String = row.get("state");
    let name: Option<String> = row.get("name");
    let patch: Option<String> = row.get("patch");
    let major: i64 = row.get("major");
    let minor: i64 = row.get("minor");

    let version = ReleaseVersion {
        major,
        minor,
        patch: patch.as_deref(),
        name: name.as_deref(),
    };
    let version_number = version.version_number();
    let version_name = version.version_name();

    Release {
        id: row.get("id"),
        uuid: row.get("uuid"),
        project_id: row.get("project_id"),
        slug: row.get("slug"),
        major,
        minor,
        state: ReleaseState::from_str(&state).unwrap_or_default(),
        version_number,
        version_name,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted: deleted != 0,
        name,
        patch,
    }
}
