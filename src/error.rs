//! Content error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort processing of a single content file.
///
/// A `ContentError` is surfaced to the caller so a broken file halts
/// that file's processing only; the rebuild pass logs it, counts the
/// file as failed and moves on. Cache corruption is never represented
/// here - it degrades to a cache miss instead.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("malformed frontmatter in `{path}`: {message}")]
    Frontmatter { path: PathBuf, message: String },
}

impl ContentError {
    /// Source file the error belongs to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io(path, _) => path,
            Self::Frontmatter { path, .. } => path,
        }
    }
}
