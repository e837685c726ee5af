//! Project persistence.

use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, QueryBuilder, Row, Sqlite};

use super::repository::{new_uuid, push_date_bounds, push_deleted, push_search, Repository};
use crate::errors::AppError;
use crate::models::{
    now_timestamp, required_text, CreateProjectRequest, Project, ProjectFilter,
    UpdateProjectRequest, NAME_MAX_LEN,
};
use crate::slug::slugify;

const PROJECT_COLUMNS: &str =
    "id, uuid, name, site_id, slug, description, created_at, updated_at, deleted";

impl Repository {
    // ==================== PUBLIC READS ====================

    /// List the live projects of a site in creation order.
    pub async fn list_projects(&self, site_id: i64) -> Result<Vec<Project>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE site_id = ? AND deleted = 0 ORDER BY created_at, id",
            PROJECT_COLUMNS
        ))
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Look up a live project by slug within a site.
    pub async fn get_project(&self, site_id: i64, slug: &str) -> Result<Project, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE site_id = ? AND slug = ? AND deleted = 0",
            PROJECT_COLUMNS
        ))
        .bind(site_id)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref()
            .map(project_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", slug)))
    }

    // ==================== ADMIN ====================

    /// List projects for the admin surface, deleted ones included unless filtered.
    pub async fn admin_list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, AppError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM projects WHERE 1 = 1",
            PROJECT_COLUMNS
        ));
        if let Some(site_id) = filter.site_id {
            qb.push(" AND site_id = ").push_bind(site_id);
        }
        push_deleted(&mut qb, filter.deleted);
        push_search(&mut qb, "name", filter.q.as_deref());
        push_date_bounds(
            &mut qb,
            filter.created_since.as_deref(),
            filter.updated_since.as_deref(),
        )?;
        qb.push(" ORDER BY created_at, id");

        let rows = qb.build().fetch_all(&self.pool).await?;
        Ok(rows.iter().map(project_from_row).collect())
    }

    /// Get a project by id, deleted or not.
    pub async fn project_by_id(&self, id: i64) -> Result<Project, AppError> {
        fetch_project(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))
    }

    /// Create a project; `site_id` applies when the request names no site.
    pub async fn create_project(
        &self,
        site_id: i64,
        request: &CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let name = required_text("name", &request.name, NAME_MAX_LEN)?;
        let slug = name_slug(&name)?;
        let site_id = request.site_id.unwrap_or(site_id);
        let description = request.description.as_deref().unwrap_or("").trim();
        let now = now_timestamp();

        let mut tx = self.begin_write().await?;

        let result = sqlx::query(
            "INSERT INTO projects (uuid, name, site_id, slug, description, created_at, updated_at, deleted) VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(new_uuid())
        .bind(&name)
        .bind(site_id)
        .bind(&slug)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let project = fetch_project(&mut *tx, result.last_insert_rowid())
            .await?
            .ok_or_else(|| AppError::Internal("Inserted project vanished".to_string()))?;
        tx.commit().await?;

        tracing::info!("Created project {} ({}) on site {}", project.id, project.slug, site_id);
        Ok(project)
    }

    /// Update a project, deriving its slug again per the slug policy.
    pub async fn update_project(
        &self,
        id: i64,
        request: &UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let mut tx = self.begin_write().await?;

        let existing = fetch_project(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;

        let name = match &request.name {
            Some(name) => required_text("name", name, NAME_MAX_LEN)?,
            None => existing.name.clone(),
        };
        let slug = self.slug_policy.resolve(&existing.slug, name_slug(&name)?);
        let site_id = request.site_id.unwrap_or(existing.site_id);
        let description = request
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or(&existing.description);

        sqlx::query(
            "UPDATE projects SET name = ?, site_id = ?, slug = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(site_id)
        .bind(&slug)
        .bind(description)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let project = fetch_project(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Project {} not found", id)))?;
        tx.commit().await?;

        if project.slug != existing.slug {
            tracing::info!(
                "Project {} slug changed from {} to {}",
                id,
                existing.slug,
                project.slug
            );
        }
        Ok(project)
    }

    /// Flag a project as deleted. The row and its children stay in place.
    pub async fn delete_project(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE projects SET deleted = 1, updated_at = ? WHERE id = ?")
            .bind(now_timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Project {} not found", id)));
        }

        tracing::info!("Soft-deleted project {}", id);
        Ok(())
    }
}

/// Slug for a project or audience name; a name without any slug characters is rejected.
pub(super) fn name_slug(name: &str) -> Result<String, AppError> {
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(AppError::Validation(format!(
            "name {:?} must contain at least one letter or digit",
            name
        )));
    }
    Ok(slug)
}

pub(super) async fn fetch_project<'e, E>(executor: E, id: i64) -> Result<Option<Project>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(&format!(
        "SELECT {} FROM projects WHERE id = ?",
        PROJECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(executor)
    .await?;

    Ok(row.as_ref().map(project_from_row))
}

pub(super) fn project_from_row(row: &SqliteRow) -> Project {
    let deleted: i32 = row.get("deleted");
    Project {
        id: row.get("id"),
        uuid: row.get("uuid"),
        name: row.get("name"),
        site_id: row.get("site_id"),
        slug: row.get("slug"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        deleted: deleted != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{project, repo, repo_with};
    use crate::slug::SlugPolicy;

    #[tokio::test]
    async fn test_slug_follows_name_and_is_stable_on_resave() {
        let (repo, _dir) = repo().await;
        let created = project(&repo, 1, "Mobile App").await;
        assert_eq!(created.slug, "mobile-app");

        let resaved = repo
            .update_project(created.id, &UpdateProjectRequest::default())
            .await
            .unwrap();
        assert_eq!(resaved.slug, "mobile-app");
    }

    #[tokio::test]
    async fn test_rename_breaks_old_slug() {
        let (repo, _dir) = repo().await;
        let created = project(&repo, 1, "Mobile App").await;

        let renamed = repo
            .update_project(
                created.id,
                &UpdateProjectRequest {
                    name: Some("Phone App".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.slug, "phone-app");

        assert!(matches!(
            repo.get_project(1, "mobile-app").await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(repo.get_project(1, "phone-app").await.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_preserve_policy_keeps_first_slug() {
        let (repo, _dir) = repo_with(SlugPolicy::PreserveFirst).await;
        let created = project(&repo, 1, "Mobile App").await;

        let renamed = repo
            .update_project(
                created.id,
                &UpdateProjectRequest {
                    name: Some("Phone App".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Phone App");
        assert_eq!(renamed.slug, "mobile-app");
    }

    #[tokio::test]
    async fn test_slug_unique_per_site() {
        let (repo, _dir) = repo().await;
        project(&repo, 1, "Mobile App").await;

        let duplicate = repo
            .create_project(
                1,
                &CreateProjectRequest {
                    name: "mobile   app!".to_string(),
                    site_id: None,
                    description: None,
                },
            )
            .await;
        assert!(matches!(duplicate, Err(AppError::Constraint(_))));

        let other_site = project(&repo, 2, "Mobile App").await;
        assert_eq!(other_site.slug, "mobile-app");
    }

    #[tokio::test]
    async fn test_deleted_project_keeps_its_slug() {
        let (repo, _dir) = repo().await;
        let created = project(&repo, 1, "Acme").await;
        repo.delete_project(created.id).await.unwrap();

        let recreated = repo
            .create_project(
                1,
                &CreateProjectRequest {
                    name: "Acme".to_string(),
                    site_id: None,
                    description: None,
                },
            )
            .await;
        assert!(matches!(recreated, Err(AppError::Constraint(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_renames_all_succeed() {
        let (repo, _dir) = repo().await;

        let mut handles = Vec::new();
        for i in 0..16 {
            let created = project(&repo, 1, &format!("Project {}", i)).await;
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                for round in 0..5 {
                    repo.update_project(
                        created.id,
                        &UpdateProjectRequest {
                            name: Some(format!("Project {} rev {}", i, round)),
                            ..Default::default()
                        },
                    )
                    .await?;
                }
                Ok::<i64, AppError>(created.id)
            }));
        }

        for (i, handle) in handles.into_iter().enumerate() {
            let id = handle.await.unwrap().unwrap();
            let saved = repo.project_by_id(id).await.unwrap();
            assert_eq!(saved.slug, format!("project-{}-rev-4", i));
        }
    }

    #[tokio::test]
    async fn test_listing_is_site_scoped_and_hides_deleted() {
        let (repo, _dir) = repo().await;
        let first = project(&repo, 1, "First").await;
        let second = project(&repo, 1, "Second").await;
        project(&repo, 2, "Elsewhere").await;

        let listed: Vec<i64> = repo.list_projects(1).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(listed, vec![first.id, second.id]);

        repo.delete_project(first.id).await.unwrap();
        let listed: Vec<i64> = repo.list_projects(1).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(listed, vec![second.id]);
        assert!(matches!(
            repo.get_project(1, "first").await,
            Err(AppError::NotFound(_))
        ));

        let admin = repo
            .admin_list_projects(&ProjectFilter {
                deleted: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(admin.len(), 1);
        assert!(admin[0].deleted);
    }

    #[tokio::test]
    async fn test_blank_or_symbol_only_names_are_rejected() {
        let (repo, _dir) = repo().await;
        for name in ["   ", "???"] {
            let result = repo
                .create_project(
                    1,
                    &CreateProjectRequest {
                        name: name.to_string(),
                        site_id: None,
                        description: None,
                    },
                )
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_admin_search_matches_name() {
        let (repo, _dir) = repo().await;
        project(&repo, 1, "Billing Portal").await;
        project(&repo, 1, "Mobile App").await;

        let found = repo
            .admin_list_projects(&ProjectFilter {
                q: Some("portal".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Billing Portal");
    }
}
