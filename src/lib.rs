//! Build-time content engine for the simpli documentation site generator.
//!
//! The engine turns a tree of markdown content files into everything the
//! surrounding site generator needs at build and request time:
//!
//! - [`content`] discovers files, splits frontmatter from body text and
//!   resolves canonical identity (id, slug, permalink) plus headings and
//!   plain text for indexing.
//! - [`cache`] persists per-file results keyed by mtime and content hash
//!   so rebuilds only reprocess changed files.
//! - [`search`] builds an in-memory inverted index over the processed
//!   documents and answers ranked, excerpted queries.
//! - [`router`] matches incoming URL paths against registered patterns
//!   (static, `:param` and `**` segments) with backtracking.
//! - [`pipeline`] wires the above into one blocking rebuild pass.
//!
//! The whole pipeline is single-threaded and synchronous: one rebuild
//! runs to completion before its results are used, and no partial
//! results are exposed mid-pass.

#[macro_use]
pub mod logger;

pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod pipeline;
pub mod router;
pub mod search;

pub use cache::ContentCache;
pub use config::EngineConfig;
pub use content::{DocumentMetadata, ProcessedDocument};
pub use error::ContentError;
pub use pipeline::{ContentEngine, RebuildReport};
pub use router::RouteMatcher;
pub use search::{QueryEngine, SearchDocument, SearchResult};
