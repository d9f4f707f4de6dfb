//! Cache manifest data structures.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Manifest file name inside the cache directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Subdirectory holding serialized payloads, named by content hash.
pub const CONTENT_DIR: &str = "content";

/// Bumped whenever the entry layout changes. A manifest with any other
/// version is discarded wholesale; there is no partial migration.
pub const MANIFEST_VERSION: u32 = 2;

/// One cached source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Absolute source file path.
    pub file_path: String,
    /// Source mtime in milliseconds since the epoch.
    pub mtime: u64,
    /// Truncated blake3 digest of the source bytes (16 hex chars).
    pub content_hash: String,
    /// Payload path relative to the cache root.
    pub cache_file: String,
    /// When the entry was written, milliseconds since the epoch.
    pub cached_at: u64,
}

/// Index of cache entries keyed by absolute source path.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    #[serde(default)]
    pub entries: FxHashMap<String, CacheEntry>,
}

impl CacheManifest {
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: FxHashMap::default(),
        }
    }
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CacheEntry {
        CacheEntry {
            file_path: "/project/docs/intro.md".to_string(),
            mtime: 1_700_000_000_000,
            content_hash: "abababababababab".to_string(),
            cache_file: "content/abababababababab.json".to_string(),
            cached_at: 1_700_000_000_123,
        }
    }

    #[test]
    fn test_manifest_roundtrip() {
        let mut manifest = CacheManifest::new();
        manifest
            .entries
            .insert(entry().file_path.clone(), entry());

        let json = serde_json::to_string(&manifest).unwrap();
        let back: CacheManifest = serde_json::from_str(&json).unwrap();

        assert_eq!(back.version, MANIFEST_VERSION);
        assert_eq!(back.entries.len(), 1);
        assert_eq!(back.entries["/project/docs/intro.md"], entry());
    }

    #[test]
    fn test_entry_json_field_names() {
        let json = serde_json::to_string(&entry()).unwrap();
        for field in ["filePath", "mtime", "contentHash", "cacheFile", "cachedAt"] {
            assert!(json.contains(field), "missing {field}");
        }
    }
}
