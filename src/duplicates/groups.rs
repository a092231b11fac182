//! Duplicate grouping and size-based file organization.
//!
//! # Overview
//!
//! This module provides the structures for grouping files by size (the
//! cheap first phase of duplicate detection) and the confirmed
//! [`DuplicateGroup`] produced by the hashing phase.
//!
//! ## Size Grouping
//!
//! Files with different sizes cannot be duplicates, so bucketing by exact
//! size removes most files from consideration without reading a byte of
//! content. Only buckets with two or more members go on to be hashed.
//!
//! # Example
//!
//! ```
//! use tidyfs::scanner::FileRecord;
//! use tidyfs::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024, 0),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024, 1),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048, 2),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.potential_duplicates, 2);  // Two 1024-byte files
//! assert_eq!(buckets.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::{hash_to_hex, Digest, FileRecord};

/// Files sharing one exact byte size, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size
    pub files: Vec<FileRecord>,
}

impl SizeBucket {
    /// Create an empty bucket.
    #[must_use]
    pub fn new(size: u64) -> Self {
        Self {
            size,
            files: Vec::new(),
        }
    }

    /// Add a file to this bucket.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if file size doesn't match bucket size.
    pub fn add(&mut self, file: FileRecord) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match bucket size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Check if this bucket can hold duplicates (2+ files).
    #[must_use]
    pub fn has_candidates(&self) -> bool {
        self.files.len() > 1
    }
}

/// Confirmed group of byte-identical files.
///
/// Always holds at least two members, ordered by traversal index. The first
/// member is the original and is never moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// SHA-256 digest of the shared content
    pub digest: Digest,
    /// File size in bytes (shared by all members)
    pub size: u64,
    /// Members in traversal order
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group, ordering members by traversal index.
    #[must_use]
    pub fn new(digest: Digest, size: u64, mut files: Vec<FileRecord>) -> Self {
        files.sort_by_key(|f| f.index);
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The member kept in place.
    #[must_use]
    pub fn original(&self) -> Option<&FileRecord> {
        self.files.first()
    }

    /// Members after the original.
    #[must_use]
    pub fn duplicates(&self) -> &[FileRecord] {
        self.files.get(1..).unwrap_or(&[])
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space held by the duplicates (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Digest as hexadecimal string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hash_to_hex(&self.digest)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// Statistics from the size grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of empty files encountered
    pub empty_files: usize,
    /// Number of size buckets with 2+ files
    pub candidate_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group files by size.
///
/// Returns only buckets with two or more files, ordered by the traversal
/// index of their first member. Members keep their input order.
///
/// Empty files are bucketed like any other size: they all share the same
/// content and are therefore duplicates of one another.
///
/// # Performance
///
/// - Time complexity: O(n) where n is the number of files
/// - No file I/O is performed (metadata only)
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeBucket>, GroupingStats) {
    let mut all_buckets: HashMap<u64, SizeBucket> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }

        all_buckets
            .entry(file.size)
            .or_insert_with(|| SizeBucket::new(file.size))
            .add(file);
    }

    stats.unique_sizes = all_buckets.len();

    let mut buckets: Vec<SizeBucket> = all_buckets
        .into_values()
        .filter(|bucket| {
            if bucket.has_candidates() {
                stats.potential_duplicates += bucket.len();
                stats.candidate_buckets += 1;
                log::debug!(
                    "Size bucket {} bytes: {} candidates",
                    bucket.size,
                    bucket.len()
                );
                true
            } else {
                stats.eliminated_unique += bucket.len();
                log::trace!("Eliminated unique size {}", bucket.size);
                false
            }
        })
        .collect();

    buckets.sort_by_key(|bucket| bucket.files.first().map_or(usize::MAX, |f| f.index));

    log::info!(
        "Size grouping: {} files -> {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (buckets, stats)
}
