//! The rebuild pass: scan, process (or reuse), index, route.
//!
//! One [`ContentEngine::rebuild`] call runs the whole pipeline to
//! completion and returns a [`RebuildReport`]; nothing is exposed
//! mid-pass. Per-file failures are logged and counted, never fatal:
//! one malformed document must not take down the site build.

use std::fs;
use std::path::Path;

use anyhow::Result;
use rustc_hash::FxHashSet;

use crate::cache::ContentCache;
use crate::config::EngineConfig;
use crate::content::{
    ProcessedDocument, extract_headings, parse_frontmatter, resolve_metadata, scan,
    strip_markdown,
};
use crate::error::ContentError;
use crate::router::RouteMatcher;
use crate::search::{SearchDocument, build_search_data};

/// Counters from one rebuild pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildStats {
    /// Content files found by the scan.
    pub scanned: usize,
    /// Files served from the cache without reprocessing.
    pub from_cache: usize,
    /// Files read and parsed this pass.
    pub parsed: usize,
    /// Files skipped after a read or parse failure.
    pub failed: usize,
    /// Documents excluded as drafts.
    pub drafts: usize,
    /// Stale cache entries dropped at the end of the pass.
    pub pruned: usize,
}

/// Everything one rebuild produces.
#[derive(Debug)]
pub struct RebuildReport {
    /// Non-draft documents in scan order (lexicographic by path).
    pub documents: Vec<ProcessedDocument>,
    /// Search payload for the documents, minus unlisted ones.
    pub search_docs: Vec<SearchDocument>,
    /// Permalink -> document id.
    pub routes: RouteMatcher<String>,
    pub stats: RebuildStats,
}

/// Owns one project's configuration and cache across rebuilds.
#[derive(Debug)]
pub struct ContentEngine {
    config: EngineConfig,
    cache: ContentCache,
}

impl ContentEngine {
    pub fn new(config: EngineConfig) -> Self {
        let cache = ContentCache::open(&config.project_root);
        Self { config, cache }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a full rebuild pass over the content directory.
    ///
    /// Files whose cached payload is still valid are reused without
    /// reading them. Documents with a duplicate id are skipped with a
    /// warning, first occurrence wins. Drafts are processed (and
    /// cached) but excluded from every output. The cache manifest is
    /// pruned and flushed once, at the end.
    pub fn rebuild(&mut self) -> Result<RebuildReport> {
        let mut stats = RebuildStats::default();
        let mut documents = Vec::new();
        let mut seen_ids = FxHashSet::default();

        let files = scan(&self.config.content_dir, &self.config.extensions);
        stats.scanned = files.len();

        for path in &files {
            let doc = match self.process(path, &mut stats) {
                Ok(doc) => doc,
                Err(err) => {
                    crate::log!("warning"; "skipping {}: {err}", path.display());
                    stats.failed += 1;
                    continue;
                }
            };

            if !seen_ids.insert(doc.metadata.id.clone()) {
                crate::log!(
                    "warning";
                    "duplicate document id `{}` from {}, keeping the first",
                    doc.metadata.id,
                    path.display()
                );
                continue;
            }
            if doc.metadata.draft {
                stats.drafts += 1;
                continue;
            }
            documents.push(doc);
        }

        if !self.config.no_cache {
            stats.pruned = self.cache.prune();
            self.cache.flush()?;
        }

        let mut routes = RouteMatcher::new();
        for doc in &documents {
            routes.insert(&doc.metadata.permalink, doc.metadata.id.clone());
        }

        let listed: Vec<ProcessedDocument> = documents
            .iter()
            .filter(|doc| !doc.metadata.unlisted)
            .cloned()
            .collect();
        let search_docs = build_search_data(&listed);

        crate::debug!(
            "engine";
            "rebuild: {} scanned, {} cached, {} parsed, {} failed",
            stats.scanned,
            stats.from_cache,
            stats.parsed,
            stats.failed
        );

        Ok(RebuildReport {
            documents,
            search_docs,
            routes,
            stats,
        })
    }

    /// Clear the on-disk cache; the next rebuild starts cold.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Process one file, consulting the cache first.
    fn process(
        &mut self,
        path: &Path,
        stats: &mut RebuildStats,
    ) -> Result<ProcessedDocument, ContentError> {
        if !self.config.no_cache {
            if let Some(doc) = self.cache.get::<ProcessedDocument>(path) {
                stats.from_cache += 1;
                return Ok(doc);
            }
        }

        let raw = fs::read_to_string(path)
            .map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
        let extracted = parse_frontmatter(&raw, path)?;
        let metadata = resolve_metadata(
            path,
            &extracted.frontmatter,
            &self.config.content_dir,
            &self.config.base_path,
        );

        let doc = ProcessedDocument {
            headings: extract_headings(&extracted.body),
            plain_text: strip_markdown(&extracted.body),
            metadata,
            body: extracted.body,
        };
        stats.parsed += 1;

        if !self.config.no_cache {
            if let Err(err) = self.cache.set(path, &doc) {
                crate::debug!("cache"; "not caching {}: {err}", path.display());
            }
        }
        Ok(doc)
    }
}
