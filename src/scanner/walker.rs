//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing directories and
//! collecting file metadata for duplicate detection. Entries inside each
//! directory are visited in file-name order, so a given tree always produces
//! the same traversal order and therefore the same choice of originals.
//!
//! # Features
//!
//! - Deterministic, single-threaded traversal
//! - Excluded subtrees (the quarantine directory) are pruned, not filtered
//! - Protected directories are pruned by their resolved path
//! - Configurable symlink following with cycle detection
//! - Size filtering (min/max)
//! - Hidden file filtering
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let root = Path::new("/home/user/Downloads");
//! let config = WalkerConfig::default().with_excluded_dir(root.join("Duplicate_Review"));
//!
//! let walker = Walker::new(root, config);
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, ScanError, WalkerConfig};

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a directory entry starts an excluded subtree.
    fn is_excluded(&self, path: &Path) -> bool {
        self.config.excluded_dirs.iter().any(|dir| path == dir)
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// Decide whether walkdir should descend into / yield an entry.
    fn keep_entry(&self, entry: &DirEntry) -> bool {
        // The root itself is always walked, even if it is named like a dotfile.
        if entry.depth() == 0 {
            return true;
        }
        if entry.file_type().is_dir() && self.is_excluded(entry.path()) {
            log::debug!("Excluding directory: {}", entry.path().display());
            return false;
        }
        if self.config.skip_hidden && is_hidden_name(entry.path()) {
            log::trace!("Skipping hidden entry: {}", entry.path().display());
            return false;
        }
        !self.is_protected(entry)
    }

    /// Whether an entry resolves inside a protected root.
    ///
    /// Directories are always resolved, which catches a protected root
    /// nested under the walk root. Followed symlinks are resolved too, so a
    /// link cannot lead the walk into a protected tree. Entries that cannot
    /// be resolved count as protected.
    fn is_protected(&self, entry: &DirEntry) -> bool {
        let protected = &self.config.protected;
        if protected.is_empty() {
            return false;
        }
        let followed_link = self.config.follow_symlinks && entry.path_is_symlink();
        if !entry.file_type().is_dir() && !followed_link {
            return false;
        }

        match entry.path().canonicalize() {
            Ok(resolved) => match protected.containing(&resolved) {
                Some(root) => {
                    log::info!(
                        "Skipping {} (inside protected directory {})",
                        entry.path().display(),
                        root.display()
                    );
                    true
                }
                None => false,
            },
            Err(e) => {
                log::debug!("Skipping unresolvable {}: {}", entry.path().display(), e);
                true
            }
        }
    }

    /// Walk the directory tree, yielding file records in traversal order.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. Records carry consecutive `index` values starting at 0.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let mut next_index = 0usize;

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| self.keep_entry(entry))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => {
                    let file_type = entry.file_type();
                    if file_type.is_dir() {
                        return None;
                    }
                    if file_type.is_symlink() && !self.config.follow_symlinks {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                        return None;
                    }

                    let metadata = match entry.metadata() {
                        Ok(m) => m,
                        Err(e) => return Some(Err(self.handle_walk_error(e))),
                    };
                    if !metadata.is_file() {
                        return None;
                    }

                    let record = self.process_file_entry(entry.into_path(), &metadata, next_index)?;
                    next_index += 1;
                    Some(Ok(record))
                }
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Build a FileRecord if the file passes the filters.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
        index: usize,
    ) -> Option<FileRecord> {
        let size = metadata.len();

        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some(FileRecord::new(path, size, index).with_modified(modified))
    }

    /// Convert a walkdir error into a ScanError.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Walker error for {}: {}", path.display(), error);
                let source = error
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                ScanError::Io { path, source }
            }
        }
    }
}

/// Whether a path's final component marks it hidden (dot-prefixed).
#[must_use]
pub fn is_hidden_name(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Whether a file is hidden: dot-prefixed, or carrying the hidden attribute on Windows.
#[must_use]
pub fn is_hidden(path: &Path, metadata: &Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
        if metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0 {
            return true;
        }
    }
    #[cfg(not(windows))]
    let _ = metadata;

    is_hidden_name(path)
}
