//! Engine settings, consumed as a plain deserialized object.
//!
//! Loading and validating the site configuration belongs to the
//! surrounding generator; the engine only receives this settings
//! struct, already resolved.

use serde::Deserialize;
use std::path::PathBuf;

/// Settings for one content root.
///
/// One `EngineConfig` describes one project; multiple engines with
/// distinct configs can coexist in-process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Project root; owns the `.simpli/cache` directory.
    pub project_root: PathBuf,
    /// Directory scanned for content files.
    pub content_dir: PathBuf,
    /// URL prefix prepended to every slug (e.g. `/docs`).
    pub base_path: String,
    /// File extensions treated as content.
    pub extensions: Vec<String>,
    /// Disable the incremental cache entirely.
    pub no_cache: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            content_dir: PathBuf::from("docs"),
            base_path: "/docs".to_string(),
            extensions: vec!["md".to_string(), "mdx".to_string()],
            no_cache: false,
        }
    }
}
