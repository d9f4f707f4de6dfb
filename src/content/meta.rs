//! Document identity and metadata resolution (pure, no I/O).

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Frontmatter, Heading};

/// Canonical identity and metadata for one content file.
///
/// Invariants: `id` is unique within a content root per scan, and
/// `permalink` is a pure function of the base path and `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Path-derived id, e.g. `guides/01-intro.mdx` -> `guides/01-intro`.
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// URL-safe path segments; numeric prefixes stripped unless overridden.
    pub slug: String,
    /// Site-relative URL: base path + slug, single-slash-normalized.
    pub permalink: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_position: Option<f64>,
    /// Explicit search-section override; the path decides otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub unlisted: bool,
    #[serde(default)]
    pub hide_title: bool,
    #[serde(default)]
    pub hide_table_of_contents: bool,
    /// Source file the metadata was resolved from.
    pub source_path: PathBuf,
}

/// A fully processed content file, ready for indexing and routing.
///
/// Created once per file per rebuild and immutable afterwards; also the
/// payload shape stored in the content cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedDocument {
    pub metadata: DocumentMetadata,
    /// Body text with the frontmatter block removed.
    pub body: String,
    pub headings: Vec<Heading>,
    /// Markdown-stripped body for search indexing.
    pub plain_text: String,
}

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+-").unwrap());

/// Resolve canonical identity and metadata for a file.
///
/// - `id`: path relative to `root_dir`, extension stripped, separators
///   normalized to `/`, trailing `/index` removed.
/// - `slug`: frontmatter override, else the id with each segment's
///   leading `\d+-` ordering prefix stripped (`01-intro` -> `intro`).
/// - `permalink`: `base_path` + slug with slash runs collapsed.
/// - `title`: frontmatter override, else Title Case of the last default
///   slug segment.
///
/// Boolean flags default to `false`; malformed values degrade to their
/// defaults rather than erroring.
pub fn resolve_metadata(
    file_path: &Path,
    frontmatter: &Frontmatter,
    root_dir: &Path,
    base_path: &str,
) -> DocumentMetadata {
    let relative = file_path.strip_prefix(root_dir).unwrap_or(file_path);
    let id = derive_id(relative);
    let default_slug = strip_numeric_prefixes(&id);

    let slug = frontmatter
        .get_str("slug")
        .map(|s| s.trim_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default_slug.clone());

    let permalink = join_url(base_path, &slug);

    let title = frontmatter
        .get_str("title")
        .map(str::to_string)
        .unwrap_or_else(|| {
            let last = default_slug.rsplit('/').next().unwrap_or(&default_slug);
            title_case(last)
        });

    let tags = match frontmatter.get("tags") {
        Some(value) => match value.as_list() {
            Some(items) => items.to_vec(),
            // A bare string is treated as a single tag.
            None => value.as_str().map(|s| vec![s.to_string()]).unwrap_or_default(),
        },
        None => Vec::new(),
    };

    DocumentMetadata {
        id,
        title,
        description: frontmatter.get_str("description").map(str::to_string),
        slug,
        permalink,
        sidebar_position: frontmatter.get_num("sidebar_position"),
        section: frontmatter.get_str("section").map(str::to_string),
        tags,
        draft: frontmatter.get_bool("draft").unwrap_or(false),
        unlisted: frontmatter.get_bool("unlisted").unwrap_or(false),
        hide_title: frontmatter.get_bool("hide_title").unwrap_or(false),
        hide_table_of_contents: frontmatter
            .get_bool("hide_table_of_contents")
            .unwrap_or(false),
        source_path: file_path.to_path_buf(),
    }
}

/// Relative path -> id: strip extension, normalize separators, drop a
/// trailing `/index`.
fn derive_id(relative: &Path) -> String {
    let no_ext = relative.with_extension("");
    let joined = no_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    joined
        .strip_suffix("/index")
        .map(str::to_string)
        .unwrap_or(joined)
}

/// Strip each segment's leading `\d+-` ordering prefix.
fn strip_numeric_prefixes(id: &str) -> String {
    id.split('/')
        .map(|segment| NUMERIC_PREFIX.replace(segment, "").into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a base path and slug, collapsing slash runs to one.
fn join_url(base_path: &str, slug: &str) -> String {
    let raw = format!("/{base_path}/{slug}");
    let mut collapsed = String::with_capacity(raw.len());
    let mut prev_slash = false;
    for c in raw.chars() {
        if c == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        collapsed.push(c);
    }
    if collapsed.len() > 1 && collapsed.ends_with('/') {
        collapsed.pop();
    }
    collapsed
}

/// Title Case a slug segment, with `-`/`_` as word separators.
fn title_case(segment: &str) -> String {
    segment
        .replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_frontmatter;

    fn fm(raw: &str) -> Frontmatter {
        parse_frontmatter(raw, Path::new("test.md"))
            .unwrap()
            .frontmatter
    }

    #[test]
    fn test_slug_derivation() {
        let meta = resolve_metadata(
            Path::new("docs/01-guides/02-intro.mdx"),
            &Frontmatter::default(),
            Path::new("docs"),
            "/docs",
        );
        assert_eq!(meta.id, "01-guides/02-intro");
        assert_eq!(meta.slug, "guides/intro");
        assert_eq!(meta.permalink, "/docs/guides/intro");
        assert_eq!(meta.title, "Intro");
    }

    #[test]
    fn test_index_suffix_removed() {
        let meta = resolve_metadata(
            Path::new("docs/guides/index.md"),
            &Frontmatter::default(),
            Path::new("docs"),
            "/docs",
        );
        assert_eq!(meta.id, "guides");
        assert_eq!(meta.permalink, "/docs/guides");
    }

    #[test]
    fn test_frontmatter_overrides() {
        let fm = fm("---\ntitle: Custom Title\nslug: custom/slug\ndescription: About\n---\n");
        let meta = resolve_metadata(
            Path::new("docs/01-page.md"),
            &fm,
            Path::new("docs"),
            "/docs",
        );
        assert_eq!(meta.title, "Custom Title");
        assert_eq!(meta.slug, "custom/slug");
        assert_eq!(meta.permalink, "/docs/custom/slug");
        assert_eq!(meta.description.as_deref(), Some("About"));
    }

    #[test]
    fn test_permalink_slash_collapsing() {
        let meta = resolve_metadata(
            Path::new("docs/intro.md"),
            &Frontmatter::default(),
            Path::new("docs"),
            "/docs/",
        );
        assert_eq!(meta.permalink, "/docs/intro");

        let meta = resolve_metadata(
            Path::new("docs/intro.md"),
            &Frontmatter::default(),
            Path::new("docs"),
            "/",
        );
        assert_eq!(meta.permalink, "/intro");
    }

    #[test]
    fn test_title_case_fallback() {
        let meta = resolve_metadata(
            Path::new("docs/getting_started-fast.md"),
            &Frontmatter::default(),
            Path::new("docs"),
            "/docs",
        );
        assert_eq!(meta.title, "Getting Started Fast");
    }

    #[test]
    fn test_flags_default_false() {
        let meta = resolve_metadata(
            Path::new("docs/a.md"),
            &Frontmatter::default(),
            Path::new("docs"),
            "/docs",
        );
        assert!(!meta.draft);
        assert!(!meta.unlisted);
        assert!(!meta.hide_title);
        assert!(!meta.hide_table_of_contents);
        assert!(meta.tags.is_empty());
        assert_eq!(meta.sidebar_position, None);
        assert_eq!(meta.section, None);
    }

    #[test]
    fn test_flags_and_position_from_frontmatter() {
        let fm = fm("---\ndraft: true\nunlisted: true\nsidebar_position: 3\ntags: [a, b]\n---\n");
        let meta = resolve_metadata(Path::new("docs/a.md"), &fm, Path::new("docs"), "/docs");
        assert!(meta.draft);
        assert!(meta.unlisted);
        assert_eq!(meta.sidebar_position, Some(3.0));
        assert_eq!(meta.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_malformed_position_degrades() {
        let fm = fm("---\nsidebar_position: soon\n---\n");
        let meta = resolve_metadata(Path::new("docs/a.md"), &fm, Path::new("docs"), "/docs");
        assert_eq!(meta.sidebar_position, None);
    }

    #[test]
    fn test_single_string_tag() {
        let fm = fm("---\ntags: guides\n---\n");
        let meta = resolve_metadata(Path::new("docs/a.md"), &fm, Path::new("docs"), "/docs");
        assert_eq!(meta.tags, vec!["guides"]);
    }

    #[test]
    fn test_purity() {
        let args = (
            Path::new("docs/01-guides/02-intro.mdx"),
            Frontmatter::default(),
            Path::new("docs"),
            "/docs",
        );
        let a = resolve_metadata(args.0, &args.1, args.2, args.3);
        let b = resolve_metadata(args.0, &args.1, args.2, args.3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_metadata_roundtrip() {
        let fm = fm("---\nsidebar_position: 2\ntags: [a]\n---\n");
        let meta = resolve_metadata(
            Path::new("docs/01-guides/02-intro.mdx"),
            &fm,
            Path::new("docs"),
            "/docs",
        );
        let json = serde_json::to_string(&meta).unwrap();
        // Boundary JSON uses the documented camelCase field names
        assert!(json.contains("\"sidebarPosition\":2.0"));
        assert!(json.contains("\"sourcePath\""));
        let back: DocumentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(meta, back);
    }
}
