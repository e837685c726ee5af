//! Slug and version-label derivation.
//!
//! Slugs are lowercase ASCII identifiers safe to embed in a URL path segment.
//! Release slugs keep the periods of their version label as separators.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_SLUG_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid slug char regex"));
static SEPARATOR_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("valid separator regex"));

/// Whether a saved entity gets a fresh slug on every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlugPolicy {
    /// Derive the slug again from the current name on every save.
    /// Renames change the slug and break previously shared links.
    #[default]
    Recompute,
    /// Keep the slug assigned at creation.
    PreserveFirst,
}

impl SlugPolicy {
    /// Pick the slug to persist for an update.
    pub fn resolve(self, existing: &str, derived: String) -> String {
        match self {
            SlugPolicy::Recompute => derived,
            SlugPolicy::PreserveFirst if !existing.is_empty() => existing.to_string(),
            SlugPolicy::PreserveFirst => derived,
        }
    }
}

/// Transliterate `value` into a URL-safe slug.
///
/// Non-ASCII text is transliterated first (`"Überblick"` becomes `"uberblick"`),
/// punctuation is dropped and runs of whitespace or hyphens collapse into one hyphen.
pub fn slugify(value: &str) -> String {
    let ascii = deunicode::deunicode(value).to_lowercase();
    let cleaned = NON_SLUG_CHARS_RE.replace_all(&ascii, "");
    let collapsed = SEPARATOR_RUN_RE.replace_all(cleaned.trim(), "-");
    collapsed.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// `"{major}.{minor}"`, with `".{patch}"` appended when a patch is present.
pub fn version_number(major: i64, minor: i64, patch: Option<&str>) -> String {
    let patch = patch.map(slugify).unwrap_or_default();
    if patch.is_empty() {
        format!("{}.{}", major, minor)
    } else {
        format!("{}.{}.{}", major, minor, patch)
    }
}

/// Human readable release label, e.g. `"v1.2 - Launch"`.
pub fn version_name(version_number: &str, name: Option<&str>) -> String {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("v{} - {}", version_number, name),
        None => format!("v{}", version_number),
    }
}

/// Slug for a release label.
///
/// Each period-separated segment is slugified on its own so the periods survive;
/// slugifying the whole label at once would strip them.
pub fn release_slug(version_name: &str) -> String {
    version_name
        .split('.')
        .map(slugify)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("My Great Project"), "my-great-project");
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_slugify_transliterates_unicode() {
        assert_eq!(slugify("Überblick Straße"), "uberblick-strasse");
        assert_eq!(slugify("Café Déjà Vu"), "cafe-deja-vu");
    }

    #[test]
    fn test_slugify_drops_periods_and_edge_separators() {
        assert_eq!(slugify("1.5"), "15");
        assert_eq!(slugify("--beta--"), "beta");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_is_idempotent() {
        let once = slugify("Release Notes: Q3 Edition");
        assert_eq!(slugify(&once), once);
    }

    #[test]
    fn test_plain_release_version() {
        let number = version_number(1, 2, None);
        assert_eq!(number, "1.2");
        let name = version_name(&number, None);
        assert_eq!(name, "v1.2");
        assert_eq!(release_slug(&name), "v1.2");
    }

    #[test]
    fn test_empty_patch_and_name_are_ignored() {
        let number = version_number(1, 2, Some("  "));
        assert_eq!(number, "1.2");
        assert_eq!(version_name(&number, Some("")), "v1.2");
    }

    #[test]
    fn test_named_release_with_patch_keeps_periods() {
        let number = version_number(1, 0, Some("beta 1"));
        assert_eq!(number, "1.0.beta-1");
        let name = version_name(&number, Some("Launch"));
        assert_eq!(name, "v1.0.beta-1 - Launch");
        assert_eq!(release_slug(&name), "v1.0.beta-1-launch");
    }

    #[test]
    fn test_release_slug_differs_from_whole_string_slug() {
        let name = version_name(&version_number(2, 10, Some("3")), None);
        assert_eq!(release_slug(&name), "v2.10.3");
        assert_eq!(slugify(&name), "v2103");
    }

    #[test]
    fn test_slug_policy() {
        assert_eq!(
            SlugPolicy::Recompute.resolve("old", "new".to_string()),
            "new"
        );
        assert_eq!(
            SlugPolicy::PreserveFirst.resolve("old", "new".to_string()),
            "old"
        );
        assert_eq!(SlugPolicy::PreserveFirst.resolve("", "new".to_string()), "new");
    }
}
