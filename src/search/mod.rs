//! Full-text search: index construction and query evaluation.

mod document;
mod engine;
mod excerpt;

pub use document::{MAX_CONTENT_LEN, SearchDocument, build_search_data};
pub use engine::{QueryEngine, SearchResult, tokenize};
pub use excerpt::{EXCERPT_WINDOW, Excerpt, ExcerptField};
