//! Inverted-index query engine with weighted term-frequency scoring.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use super::document::SearchDocument;
use super::excerpt::{Excerpt, build_excerpts};

/// Weight of an exact match against a title token.
const TITLE_WEIGHT: u32 = 10;
/// Weight of an exact match against a content token.
const CONTENT_WEIGHT: u32 = 1;
/// Prefix-match credit against title tokens (incremental typing).
const TITLE_PREFIX_WEIGHT: u32 = 5;
/// Prefix-match credit against content tokens.
const CONTENT_PREFIX_WEIGHT: u32 = 1;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Normalize text into search tokens.
///
/// Lowercased, punctuation replaced by spaces, split on whitespace;
/// tokens shorter than two characters are dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");
    cleaned
        .split_whitespace()
        .filter(|token| token.len() >= 2)
        .map(str::to_string)
        .collect()
}

/// One ranked hit, produced per query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    pub path: String,
    pub section: String,
    pub tags: Vec<String>,
    pub score: u32,
    pub excerpts: Vec<Excerpt>,
}

/// In-memory inverted index over loaded search documents.
///
/// The index is rebuilt wholesale by [`load`](Self::load) whenever
/// content changes; there is no incremental maintenance.
#[derive(Debug, Default)]
pub struct QueryEngine {
    docs: Vec<SearchDocument>,
    /// Token -> positions of documents whose title contains it.
    title_index: FxHashMap<String, FxHashSet<usize>>,
    /// Token -> positions of documents whose body or headings contain it.
    content_index: FxHashMap<String, FxHashSet<usize>>,
}

impl QueryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Clear and rebuild both inverted indices from `docs`.
    pub fn load(&mut self, docs: Vec<SearchDocument>) {
        self.title_index.clear();
        self.content_index.clear();

        for (pos, doc) in docs.iter().enumerate() {
            for token in tokenize(&doc.title) {
                self.title_index.entry(token).or_default().insert(pos);
            }

            // The content index covers the body plus all headings.
            let mut indexed = doc.content.clone();
            for heading in &doc.headings {
                indexed.push(' ');
                indexed.push_str(heading);
            }
            for token in tokenize(&indexed) {
                self.content_index.entry(token).or_default().insert(pos);
            }
        }

        self.docs = docs;
    }

    /// Answer a query with at most `limit` ranked results.
    ///
    /// Per query token a document scores +10 for an exact title-token
    /// match and +1 for an exact content-token match; indexed tokens
    /// that merely start with the query token add smaller prefix
    /// credit. Results sort by score descending; ties keep document
    /// load order (the sort is stable by construction, which callers
    /// may not rely on beyond determinism).
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let tokens = tokenize(query);
        if tokens.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let mut scores: FxHashMap<usize, u32> = FxHashMap::default();
        for token in &tokens {
            if let Some(positions) = self.title_index.get(token) {
                for &pos in positions {
                    *scores.entry(pos).or_default() += TITLE_WEIGHT;
                }
            }
            if let Some(positions) = self.content_index.get(token) {
                for &pos in positions {
                    *scores.entry(pos).or_default() += CONTENT_WEIGHT;
                }
            }

            for (indexed, positions) in &self.title_index {
                if is_strict_prefix(token, indexed) {
                    for &pos in positions {
                        *scores.entry(pos).or_default() += TITLE_PREFIX_WEIGHT;
                    }
                }
            }
            for (indexed, positions) in &self.content_index {
                if is_strict_prefix(token, indexed) {
                    for &pos in positions {
                        *scores.entry(pos).or_default() += CONTENT_PREFIX_WEIGHT;
                    }
                }
            }
        }

        let mut ranked: Vec<(usize, u32)> = scores.into_iter().collect();
        // Position order first, then a stable sort by score, keeps
        // equal-score results in document load order.
        ranked.sort_by_key(|&(pos, _)| pos);
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit);

        ranked
            .into_iter()
            .map(|(pos, score)| {
                let doc = &self.docs[pos];
                SearchResult {
                    id: doc.id.clone(),
                    title: doc.title.clone(),
                    path: doc.path.clone(),
                    section: doc.section.clone(),
                    tags: doc.tags.clone(),
                    score,
                    excerpts: build_excerpts(doc, &tokens),
                }
            })
            .collect()
    }
}

/// `query` is a strict prefix of `indexed` (never equal).
fn is_strict_prefix(query: &str, indexed: &str) -> bool {
    indexed.len() > query.len() && indexed.starts_with(query)
}
