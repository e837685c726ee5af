//! Display-ready projections for the public pages.

use serde::Serialize;

use super::{normalize_language, Audience, Note, NoteType, Project, Release, ReleaseState, Translation};

/// A note as shown on a release page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub audience: Option<Audience>,
    pub translations: Vec<Translation>,
    /// Description in the requested language, falling back to the note's own text.
    pub localized_description: String,
}

impl NoteView {
    /// Assemble a view, resolving the description for `language`.
    pub fn new(
        note: Note,
        audience: Option<Audience>,
        translations: Vec<Translation>,
        language: Option<&str>,
    ) -> Self {
        let localized_description = language
            .and_then(|lang| pick_translation(&translations, lang))
            .map(|t| t.description.clone())
            .unwrap_or_else(|| note.description.clone());
        Self {
            note,
            audience,
            translations,
            localized_description,
        }
    }
}

/// Pick the translation for `language`: exact match first, then the primary subtag
/// (`de-at` falls back to `de`). Among several matches the latest update wins.
pub fn pick_translation<'a>(translations: &'a [Translation], language: &str) -> Option<&'a Translation> {
    let language = normalize_language(language);
    if language.is_empty() {
        return None;
    }
    let latest = |wanted: &str| {
        translations
            .iter()
            .filter(|t| !t.deleted && t.language == wanted)
            .max_by(|a, b| a.updated_at.cmp(&b.updated_at).then(a.id.cmp(&b.id)))
    };
    latest(language.as_str()).or_else(|| {
        language
            .split_once('-')
            .and_then(|(primary, _)| latest(primary))
    })
}

/// A release page: the release's notes partitioned by note type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseNotesView {
    pub project: Project,
    pub release: Release,
    pub new_features: Vec<NoteView>,
    pub bug_fixes: Vec<NoteView>,
    pub known_issues: Vec<NoteView>,
}

impl ReleaseNotesView {
    /// Partition `notes` into the three buckets.
    ///
    /// Deleted notes are dropped. Each bucket is ordered by `order`, then creation
    /// time, then id.
    pub fn partition(project: Project, release: Release, notes: Vec<NoteView>) -> Self {
        let mut new_features = Vec::new();
        let mut bug_fixes = Vec::new();
        let mut known_issues = Vec::new();

        for view in notes.into_iter().filter(|v| !v.note.deleted) {
            match view.note.note_type {
                NoteType::NewFeature => new_features.push(view),
                NoteType::BugFix => bug_fixes.push(view),
                NoteType::KnownIssues => known_issues.push(view),
            }
        }

        for bucket in [&mut new_features, &mut bug_fixes, &mut known_issues] {
            bucket.sort_by(|a, b| {
                (a.note.order, &a.note.created_at, a.note.id).cmp(&(
                    b.note.order,
                    &b.note.created_at,
                    b.note.id,
                ))
            });
        }

        Self {
            project,
            release,
            new_features,
            bug_fixes,
            known_issues,
        }
    }
}

/// A project page: the project with its releases, newest version first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    pub project: Project,
    pub releases: Vec<Release>,
    /// Newest release marked `CURRENT`, if any.
    pub current_release: Option<Release>,
}

impl ProjectDetail {
    /// `releases` must already be ordered newest first.
    pub fn new(project: Project, releases: Vec<Release>, current_release: Option<Release>) -> Self {
        Self {
            project,
            releases,
            current_release,
        }
    }
}

/// Newest `CURRENT` release in a newest-first list.
pub fn current_release(releases: &[Release]) -> Option<&Release> {
    releases
        .iter()
        .find(|r| !r.deleted && r.state == ReleaseState::Current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: 1,
            uuid: "p".to_string(),
            name: "Acme".to_string(),
            site_id: 1,
            slug: "acme".to_string(),
            description: String::new(),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
            deleted: false,
        }
    }

    fn release(id: i64, major: i64, state: ReleaseState) -> Release {
        Release {
            id,
            uuid: format!("r{}", id),
            name: None,
            project_id: 1,
            slug: format!("v{}.0", major),
            major,
            minor: 0,
            patch: None,
            state,
            version_number: format!("{}.0", major),
            version_name: format!("v{}.0", major),
            created_at: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000000Z".to_string(),
            deleted: false,
        }
    }

    fn note(id: i64, note_type: NoteType, order: i64, created_at: &str) -> Note {
        Note {
            id,
            uuid: format!("n{}", id),
            note_type,
            release_id: 1,
            audience_id: None,
            description: format!("note {}", id),
            order,
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
            deleted: false,
        }
    }

    fn translation(id: i64, language: &str, updated_at: &str) -> Translation {
        Translation {
            id,
            uuid: format!("t{}", id),
            note_id: 1,
            language: language.to_string(),
            description: format!("{} text {}", language, id),
            created_at: updated_at.to_string(),
            updated_at: updated_at.to_string(),
            deleted: false,
        }
    }

    fn ids(bucket: &[NoteView]) -> Vec<i64> {
        bucket.iter().map(|v| v.note.id).collect()
    }

    #[test]
    fn test_partition_buckets_and_orders_notes() {
        let mut deleted = note(6, NoteType::BugFix, 0, "2024-01-01T00:00:06.000000Z");
        deleted.deleted = true;
        let notes = vec![
            note(1, NoteType::NewFeature, 5, "2024-01-01T00:00:01.000000Z"),
            note(2, NoteType::BugFix, 1, "2024-01-01T00:00:02.000000Z"),
            note(3, NoteType::NewFeature, 0, "2024-01-01T00:00:03.000000Z"),
            note(4, NoteType::KnownIssues, 0, "2024-01-01T00:00:04.000000Z"),
            note(5, NoteType::NewFeature, 0, "2024-01-01T00:00:00.000000Z"),
            deleted,
        ]
        .into_iter()
        .map(|n| NoteView::new(n, None, Vec::new(), None))
        .collect();

        let view = ReleaseNotesView::partition(project(), release(1, 1, ReleaseState::Current), notes);

        assert_eq!(ids(&view.new_features), vec![5, 3, 1]);
        assert_eq!(ids(&view.bug_fixes), vec![2]);
        assert_eq!(ids(&view.known_issues), vec![4]);
    }

    #[test]
    fn test_localized_description_fallbacks() {
        let translations = vec![
            translation(1, "de", "2024-01-01T00:00:00.000000Z"),
            translation(2, "de", "2024-02-01T00:00:00.000000Z"),
            translation(3, "pt-br", "2024-01-01T00:00:00.000000Z"),
        ];
        let base = note(1, NoteType::NewFeature, 0, "2024-01-01T00:00:00.000000Z");

        let exact = NoteView::new(base.clone(), None, translations.clone(), Some("pt_BR"));
        assert_eq!(exact.localized_description, "pt-br text 3");

        let primary = NoteView::new(base.clone(), None, translations.clone(), Some("de-AT"));
        assert_eq!(primary.localized_description, "de text 2");

        let missing = NoteView::new(base.clone(), None, translations.clone(), Some("fr"));
        assert_eq!(missing.localized_description, "note 1");

        let unset = NoteView::new(base, None, translations, None);
        assert_eq!(unset.localized_description, "note 1");
    }

    #[test]
    fn test_current_release_picks_first_current() {
        let releases = vec![
            release(3, 3, ReleaseState::Future),
            release(2, 2, ReleaseState::Current),
            release(1, 1, ReleaseState::Current),
        ];
        assert_eq!(current_release(&releases).map(|r| r.id), Some(2));
        assert!(current_release(&releases[..1]).is_none());
    }
}
