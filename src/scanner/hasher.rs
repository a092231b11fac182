//! SHA-256 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing SHA-256 digests
//! of file contents. Files are read in fixed-size chunks so memory use stays
//! bounded regardless of file size. Every call to [`Hasher::digest`] owns its
//! own accumulator, so one `Hasher` can be shared across worker threads.
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let digest = hasher.digest(Path::new("photo.jpg")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha2::{Digest as _, Sha256};

use super::HashError;

/// A 32-byte SHA-256 content digest.
pub type Digest = [u8; 32];

/// Default read chunk size (8 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Smallest chunk size accepted; smaller requests are raised to this.
pub const MIN_CHUNK_SIZE: usize = 4 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 8 KiB chunk size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Create a hasher with a custom chunk size (at least [`MIN_CHUNK_SIZE`]).
    #[must_use]
    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(MIN_CHUNK_SIZE),
        }
    }

    /// The chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Compute the SHA-256 digest of a file's full content.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the file vanished before or while it was read
    /// - `PermissionDenied` if it cannot be opened or read
    /// - `Io` for any other read failure (locked file, device error)
    pub fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let n = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(hasher.finalize().into())
    }

    /// Compute the digest of an in-memory buffer.
    #[must_use]
    pub fn digest_bytes(data: &[u8]) -> Digest {
        Sha256::digest(data).into()
    }
}

/// Render a digest as lowercase hexadecimal (64 characters).
#[must_use]
pub fn hash_to_hex(hash: &Digest) -> String {
    use std::fmt::Write;

    hash.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}
