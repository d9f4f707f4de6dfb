//! Content hashing for change detection using blake3.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A 256-bit content hash (blake3 output).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

/// Length of the truncated hex digest stored in the manifest.
///
/// Sixteen hex chars (64 bits) is plenty for a per-project content
/// cache; a collision only costs a stale cache hit.
pub const SHORT_HEX_LEN: usize = 16;

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    #[inline]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash a byte buffer.
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(*blake3::hash(bytes).as_bytes())
    }

    /// Hash a file's contents; `None` if the file cannot be read.
    pub fn of_file(path: &Path) -> Option<Self> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::with_capacity(64 * 1024, file);
        let mut hasher = blake3::Hasher::new();
        let mut buffer = [0u8; 64 * 1024];

        loop {
            match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buffer[..n]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(_) => return None,
            }
        }

        Some(Self(*hasher.finalize().as_bytes()))
    }

    /// Convert to full hex string.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    /// Truncated hex digest, the form persisted in the manifest.
    pub fn short_hex(self) -> String {
        self.to_hex()[..SHORT_HEX_LEN].to_string()
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.to_hex()[..SHORT_HEX_LEN])
    }
}
