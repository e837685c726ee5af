//! Public release notes pages.

use axum::extract::{
    rejection::QueryRejection,
    Path, Query, State,
};

use super::{success, ApiResult, SiteId};
use crate::models::{
    current_release, parse_state, Project, ProjectDetail, ProjectViewQuery, ReleaseNotesView,
    ReleaseViewQuery,
};
use crate::AppState;

/// GET / - Projects of the site.
pub async fn index(State(state): State<AppState>, site: SiteId) -> ApiResult<Vec<Project>> {
    success(state.repo.list_projects(site.0).await?)
}

/// GET /:project_slug/ - A project and its releases.
pub async fn project_detail(
    State(state): State<AppState>,
    site: SiteId,
    Path(project_slug): Path<String>,
    query: Result<Query<ProjectViewQuery>, QueryRejection>,
) -> ApiResult<ProjectDetail> {
    let Query(query) = query?;
    let state_filter = query.state.as_deref().map(parse_state).transpose()?;

    let project = state.repo.get_project(site.0, &project_slug).await?;
    let releases = state.repo.list_project_releases(project.id, None).await?;
    let current = current_release(&releases).cloned();
    let releases = match state_filter {
        Some(wanted) => releases.into_iter().filter(|r| r.state == wanted).collect(),
        None => releases,
    };

    success(ProjectDetail::new(project, releases, current))
}

/// GET /:project_slug/:release_slug/ - Release notes partitioned by type.
pub async fn release_detail(
    State(state): State<AppState>,
    site: SiteId,
    Path((project_slug, release_slug)): Path<(String, String)>,
    query: Result<Query<ReleaseViewQuery>, QueryRejection>,
) -> ApiResult<ReleaseNotesView> {
    let Query(query) = query?;

    let project = state.repo.get_project(site.0, &project_slug).await?;
    let release = state
        .repo
        .get_release(site.0, &project_slug, &release_slug)
        .await?;
    let audience = match query.audience.as_deref() {
        Some(slug) => Some(state.repo.get_audience(project.id, slug).await?),
        None => None,
    };

    let view = state
        .repo
        .release_notes_view(project, release, audience.as_ref(), query.lang.as_deref())
        .await?;
    success(view)
}
