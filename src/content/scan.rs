//! Content file discovery (pure, reads the filesystem only).

use std::fs;
use std::path::{Path, PathBuf};

/// Directories never descended into.
const SKIPPED_DIRS: &[&str] = &["node_modules"];

/// Collect content files under `root`, filtered by extension.
///
/// Entries starting with `.` are skipped, as are files starting with
/// `_` (partials) and dependency cache directories. Results are sorted
/// lexicographically so downstream document ids are deterministic
/// across runs. A missing root yields an empty list, not an error.
pub fn scan(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }

    let mut results = Vec::new();
    // Explicit work stack keeps very deep trees off the call stack.
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }

            if path.is_dir() {
                if !SKIPPED_DIRS.contains(&name) {
                    pending.push(path);
                }
                continue;
            }

            if name.starts_with('_') {
                continue;
            }
            let wanted = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e == ext));
            if wanted {
                results.push(path);
            }
        }
    }

    results.sort();
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["md".to_string(), "mdx".to_string()]
    }

    #[test]
    fn test_scan_nonexistent_root() {
        let dir = TempDir::new().unwrap();
        let files = scan(&dir.path().join("missing"), &exts());
        assert!(files.is_empty());
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("guides")).unwrap();
        fs::write(root.join("zeta.md"), "z").unwrap();
        fs::write(root.join("alpha.mdx"), "a").unwrap();
        fs::write(root.join("notes.txt"), "not content").unwrap();
        fs::write(root.join("guides/intro.md"), "i").unwrap();

        let files = scan(root, &exts());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["alpha.mdx", "guides/intro.md", "zeta.md"]);
    }

    #[test]
    fn test_scan_skips_hidden_and_partials() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join(".git/config.md"), "x").unwrap();
        fs::write(root.join("node_modules/pkg/readme.md"), "x").unwrap();
        fs::write(root.join(".hidden.md"), "x").unwrap();
        fs::write(root.join("_partial.md"), "x").unwrap();
        fs::write(root.join("visible.md"), "x").unwrap();

        let files = scan(root, &exts());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("visible.md"));
    }

    #[test]
    fn test_scan_deep_tree() {
        let dir = TempDir::new().unwrap();
        let mut path = dir.path().to_path_buf();
        for i in 0..50 {
            path = path.join(format!("d{i}"));
        }
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("deep.md"), "x").unwrap();

        let files = scan(dir.path(), &exts());
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_scan_deterministic() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["b.md", "a.md", "c.md"] {
            fs::write(root.join(name), "x").unwrap();
        }
        assert_eq!(scan(root, &exts()), scan(root, &exts()));
    }
}
