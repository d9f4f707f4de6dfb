//! Incremental content cache keyed by mtime and content hash.

mod hash;
mod manifest;
mod store;

pub use hash::{ContentHash, SHORT_HEX_LEN};
pub use manifest::{CONTENT_DIR, CacheEntry, CacheManifest, MANIFEST_FILE, MANIFEST_VERSION};
pub use store::{CACHE_DIR, ContentCache};
