//! On-disk content cache: mtime fast path, content-hash slow path.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use serde::{Serialize, de::DeserializeOwned};

use super::hash::ContentHash;
use super::manifest::{CONTENT_DIR, CacheEntry, CacheManifest, MANIFEST_FILE, MANIFEST_VERSION};

/// Cache directory inside the project root.
pub const CACHE_DIR: &str = ".simpli/cache";

/// Per-project cache of processed file payloads.
///
/// One instance exclusively owns one cache directory. No file locking
/// is performed, so two processes sharing a cache directory can race;
/// the engine is explicitly single-process per project root.
///
/// All mutations batch in memory behind a dirty flag; nothing reaches
/// the manifest on disk until [`flush`](Self::flush), which the rebuild
/// pass calls exactly once after all per-file work.
#[derive(Debug)]
pub struct ContentCache {
    cache_dir: PathBuf,
    manifest: CacheManifest,
    dirty: bool,
}

impl ContentCache {
    /// Open (or initialize) the cache under `project_root`.
    ///
    /// A missing, unparseable or version-mismatched manifest starts the
    /// cache empty - a cold rebuild, never a partial migration.
    pub fn open(project_root: &Path) -> Self {
        let cache_dir = project_root.join(CACHE_DIR);
        let manifest = load_manifest(&cache_dir.join(MANIFEST_FILE));
        Self {
            cache_dir,
            manifest,
            dirty: false,
        }
    }

    /// Check whether a fresh cached payload exists for `path`.
    ///
    /// Stored mtime equal to the current one validates cheaply; on a
    /// mismatch the content hash decides. A hash match means the file
    /// was touched but not changed, so the stored mtime is healed in
    /// memory (flushed with the next batch). Any I/O failure counts as
    /// invalid.
    pub fn has(&mut self, path: &Path) -> bool {
        let key = cache_key(path);
        let Some(entry) = self.manifest.entries.get(&key) else {
            return false;
        };
        let Some(current_mtime) = mtime_ms(path) else {
            return false;
        };

        let payload = self.cache_dir.join(&entry.cache_file);
        if entry.mtime == current_mtime {
            return payload.exists();
        }

        let Some(hash) = ContentHash::of_file(path) else {
            return false;
        };
        if hash.short_hex() != entry.content_hash {
            return false;
        }

        crate::debug!("cache"; "healed mtime for {}", path.display());
        if let Some(entry) = self.manifest.entries.get_mut(&key) {
            entry.mtime = current_mtime;
        }
        self.dirty = true;
        payload.exists()
    }

    /// Fetch the cached payload for `path`, if still valid.
    ///
    /// A corrupted payload file is a cache miss; its manifest entry is
    /// dropped so the next rebuild reprocesses the file.
    pub fn get<T: DeserializeOwned>(&mut self, path: &Path) -> Option<T> {
        if !self.has(path) {
            return None;
        }
        let key = cache_key(path);
        let entry = self.manifest.entries.get(&key)?;
        let payload = self.cache_dir.join(&entry.cache_file);

        let parsed = fs::read_to_string(&payload)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok());
        if parsed.is_none() {
            crate::debug!("cache"; "dropping corrupted payload for {}", path.display());
            self.manifest.entries.remove(&key);
            self.dirty = true;
        }
        parsed
    }

    /// Store a payload for `path`, keyed by its current content hash.
    pub fn set<T: Serialize>(&mut self, path: &Path, data: &T) -> Result<()> {
        let hash = ContentHash::of_file(path)
            .ok_or_else(|| anyhow!("cannot hash `{}`", path.display()))?;
        let short = hash.short_hex();
        let cache_file = format!("{CONTENT_DIR}/{short}.json");
        let payload = self.cache_dir.join(&cache_file);

        if let Some(parent) = payload.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating cache dir `{}`", parent.display()))?;
        }
        fs::write(&payload, serde_json::to_string(data)?)
            .with_context(|| format!("writing cache payload `{}`", payload.display()))?;

        let key = cache_key(path);
        self.manifest.entries.insert(
            key.clone(),
            CacheEntry {
                file_path: key,
                mtime: mtime_ms(path).unwrap_or(0),
                content_hash: short,
                cache_file,
                cached_at: now_ms(),
            },
        );
        self.dirty = true;
        Ok(())
    }

    /// Drop the entry for `path`, if present.
    pub fn invalidate(&mut self, path: &Path) {
        if self.manifest.entries.remove(&cache_key(path)).is_some() {
            self.dirty = true;
        }
    }

    /// Drop entries whose source file no longer exists.
    pub fn prune(&mut self) -> usize {
        let before = self.manifest.entries.len();
        self.manifest
            .entries
            .retain(|key, _| Path::new(key).exists());
        let removed = before - self.manifest.entries.len();
        if removed > 0 {
            self.dirty = true;
        }
        removed
    }

    /// Delete the whole cache directory and reset the manifest.
    pub fn clear(&mut self) {
        fs::remove_dir_all(&self.cache_dir).ok();
        self.manifest = CacheManifest::new();
        self.dirty = false;
    }

    /// Write the manifest to disk, only if something changed.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        fs::create_dir_all(&self.cache_dir)
            .with_context(|| format!("creating cache dir `{}`", self.cache_dir.display()))?;
        let json = serde_json::to_string_pretty(&self.manifest)?;
        fs::write(self.cache_dir.join(MANIFEST_FILE), json)
            .context("writing cache manifest")?;
        self.dirty = false;
        Ok(())
    }

    /// Whether unsaved manifest changes are pending.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of manifest entries.
    pub fn len(&self) -> usize {
        self.manifest.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manifest.entries.is_empty()
    }
}

/// Load the manifest, or start empty on any failure.
fn load_manifest(path: &Path) -> CacheManifest {
    let Ok(json) = fs::read_to_string(path) else {
        return CacheManifest::new();
    };
    match serde_json::from_str::<CacheManifest>(&json) {
        Ok(manifest) if manifest.version == MANIFEST_VERSION => manifest,
        Ok(manifest) => {
            crate::debug!(
                "cache";
                "manifest version {} != {MANIFEST_VERSION}, starting cold",
                manifest.version
            );
            CacheManifest::new()
        }
        Err(_) => CacheManifest::new(),
    }
}

fn cache_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn mtime_ms(path: &Path) -> Option<u64> {
    let modified = path.metadata().ok()?.modified().ok()?;
    modified
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Bump a file's mtime without touching its bytes.
    fn bump_mtime(path: &Path) {
        let file = File::options().append(true).open(path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5))
            .unwrap();
    }

    #[test]
    fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let file = write_doc(&dir, "intro.md", "content");

        cache.set(&file, &vec!["payload".to_string()]).unwrap();
        let got: Vec<String> = cache.get(&file).unwrap();
        assert_eq!(got, vec!["payload"]);
    }

    #[test]
    fn test_modified_content_invalidates() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let file = write_doc(&dir, "intro.md", "original");

        cache.set(&file, &1u32).unwrap();
        assert!(cache.has(&file));

        fs::write(&file, "changed").unwrap();
        bump_mtime(&file);
        assert!(!cache.has(&file));
        assert_eq!(cache.get::<u32>(&file), None);
    }

    #[test]
    fn test_touch_without_change_heals_mtime() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let file = write_doc(&dir, "intro.md", "stable");

        cache.set(&file, &1u32).unwrap();
        cache.flush().unwrap();
        assert!(!cache.is_dirty());

        // Same bytes, new mtime: still a hit, dirty exactly once.
        bump_mtime(&file);
        assert!(cache.has(&file));
        assert!(cache.is_dirty());

        cache.flush().unwrap();
        assert!(cache.has(&file));
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_missing_payload_invalidates() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let file = write_doc(&dir, "intro.md", "content");

        cache.set(&file, &1u32).unwrap();
        fs::remove_dir_all(dir.path().join(CACHE_DIR).join(CONTENT_DIR)).unwrap();
        assert!(!cache.has(&file));
    }

    #[test]
    fn test_corrupted_payload_drops_entry() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let file = write_doc(&dir, "intro.md", "content");

        cache.set(&file, &vec![1u32, 2]).unwrap();
        let hash = ContentHash::of_file(&file).unwrap().short_hex();
        let payload = dir
            .path()
            .join(CACHE_DIR)
            .join(CONTENT_DIR)
            .join(format!("{hash}.json"));
        fs::write(&payload, "{not json").unwrap();

        assert_eq!(cache.get::<Vec<u32>>(&file), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_flush_and_reload() {
        let dir = TempDir::new().unwrap();
        let file = write_doc(&dir, "intro.md", "content");

        let mut cache = ContentCache::open(dir.path());
        cache.set(&file, &"payload".to_string()).unwrap();
        cache.flush().unwrap();

        let mut reopened = ContentCache::open(dir.path());
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get::<String>(&file).as_deref(), Some("payload"));
    }

    #[test]
    fn test_version_mismatch_starts_cold() {
        let dir = TempDir::new().unwrap();
        let file = write_doc(&dir, "intro.md", "content");

        let mut cache = ContentCache::open(dir.path());
        cache.set(&file, &1u32).unwrap();
        cache.flush().unwrap();

        // Rewrite the manifest with a stale version
        let manifest_path = dir.path().join(CACHE_DIR).join(MANIFEST_FILE);
        let json = fs::read_to_string(&manifest_path).unwrap();
        let bumped = json.replacen(
            &format!("\"version\": {MANIFEST_VERSION}"),
            "\"version\": 1",
            1,
        );
        assert_ne!(json, bumped);
        fs::write(&manifest_path, bumped).unwrap();

        let reopened = ContentCache::open(dir.path());
        assert!(reopened.is_empty());
    }

    #[test]
    fn test_garbled_manifest_starts_cold() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join(CACHE_DIR).join(MANIFEST_FILE);
        fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
        fs::write(&manifest_path, "definitely not json").unwrap();

        let cache = ContentCache::open(dir.path());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_prune_removes_dead_entries() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let keep = write_doc(&dir, "keep.md", "k");
        let gone = write_doc(&dir, "gone.md", "g");

        cache.set(&keep, &1u32).unwrap();
        cache.set(&gone, &2u32).unwrap();
        fs::remove_file(&gone).unwrap();

        assert_eq!(cache.prune(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&keep));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        let file = write_doc(&dir, "intro.md", "content");

        cache.set(&file, &1u32).unwrap();
        cache.invalidate(&file);
        assert!(!cache.has(&file));

        cache.set(&file, &1u32).unwrap();
        cache.flush().unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert!(!dir.path().join(CACHE_DIR).exists());
    }

    #[test]
    fn test_flush_skips_when_clean() {
        let dir = TempDir::new().unwrap();
        let mut cache = ContentCache::open(dir.path());
        cache.flush().unwrap();
        // Nothing was dirty, so nothing was written
        assert!(!dir.path().join(CACHE_DIR).join(MANIFEST_FILE).exists());
    }
}
