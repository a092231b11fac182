//! Duplicate finder implementation with two-phase detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk**: enumerate regular files in deterministic order, pruning the
//!    quarantine subtree
//! 2. **Phase 1 - Size grouping**: bucket by exact size and drop singletons
//!    (see [`crate::duplicates::groups`])
//! 3. **Phase 2 - Hashing**: SHA-256 every remaining candidate, bucket by
//!    digest and drop singletons
//!
//! Hash failures never abort a scan. The file is excluded, counted in
//! [`ScanSummary::hash_failures`] and written to the audit log.
//!
//! # Ordering
//!
//! Every [`FileRecord`] carries its traversal index. Groups are built from
//! results collected in input order and sorted by that index, so parallel
//! hashing (`io_threads > 1`) yields exactly the same groups and the same
//! originals as the sequential path.
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
//! let (groups, summary) = finder.find_groups(Path::new("/home/user/Downloads")).unwrap();
//!
//! for group in &groups {
//!     println!("{} copies of {}", group.len(), group.digest_hex());
//! }
//! println!("Reclaimable: {}", summary.reclaimable_display());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::{group_by_size, DuplicateGroup};
use crate::audit::AuditLog;
use crate::progress::ProgressCallback;
use crate::scanner::{
    Digest, FileRecord, HashError, Hasher, ScanError, Walker, WalkerConfig, DEFAULT_CHUNK_SIZE,
};

/// Default name of the quarantine subdirectory.
pub const DEFAULT_QUARANTINE_DIR: &str = "Duplicate_Review";

/// Files above this size get a debug line when hashed.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of hashing threads. 1 hashes sequentially on the caller's thread.
    pub io_threads: usize,
    /// Read chunk size for hashing, in bytes.
    pub chunk_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Name of the quarantine subdirectory pruned from every scanned root.
    pub quarantine_dir: Option<String>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
    /// Sink for hash failures.
    pub audit: Arc<AuditLog>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("chunk_size", &self.chunk_size)
            .field("walker_config", &self.walker_config)
            .field("quarantine_dir", &self.quarantine_dir)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .field("audit", &self.audit.path())
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 1,
            chunk_size: DEFAULT_CHUNK_SIZE,
            walker_config: WalkerConfig::default(),
            quarantine_dir: Some(DEFAULT_QUARANTINE_DIR.to_string()),
            progress_callback: None,
            audit: Arc::new(AuditLog::disabled()),
        }
    }
}

impl FinderConfig {
    /// Set the hashing thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the hashing chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the quarantine subdirectory name, or `None` to scan everything.
    #[must_use]
    pub fn with_quarantine_dir(mut self, name: Option<String>) -> Self {
        self.quarantine_dir = name;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Set the audit log.
    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = audit;
        self
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Total number of files enumerated
    pub total_files: usize,
    /// Total size of all enumerated files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of candidates successfully hashed
    pub hashed_files: usize,
    /// Number of candidates excluded because hashing failed
    pub hash_failures: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space held by duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Non-fatal errors from walking and hashing
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        format_size(self.reclaimable_space)
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        format_size(self.total_size)
    }
}

/// Format a byte size as a human-readable string.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    bytesize::ByteSize(bytes).to_string()
}

/// Errors that can occur during duplicate finding.
///
/// Only a bad root escalates; per-file problems land in [`ScanSummary`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while resolving the root.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validate that `path` exists and is a directory.
///
/// # Errors
///
/// [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`].
pub fn validate_root(path: &Path) -> Result<(), FinderError> {
    if !path.exists() {
        return Err(FinderError::PathNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(FinderError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Duplicate finder that orchestrates the two-phase detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::with_chunk_size(config.chunk_size);
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate groups under `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if the path does not exist or is not a
    /// directory. Nothing else escalates.
    pub fn find_groups(
        &self,
        root: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        validate_root(root)?;
        let root = std::path::absolute(root)?;

        log::info!("Starting duplicate scan of {}", root.display());

        let mut walker_config = self.config.walker_config.clone();
        if let Some(ref name) = self.config.quarantine_dir {
            walker_config = walker_config.with_excluded_dir(root.join(name));
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let walker = Walker::new(&root, walker_config);
        let mut files = Vec::new();
        let mut walk_errors = Vec::new();
        for result in walker.walk() {
            match result {
                Ok(file) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(files.len() + 1, &file.path.to_string_lossy());
                    }
                    files.push(file);
                }
                Err(e) => walk_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        let (groups, mut summary) = self.group_records(files);
        walk_errors.append(&mut summary.scan_errors);
        summary.scan_errors = walk_errors;
        summary.scan_duration = start_time.elapsed();

        Ok((groups, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Records should carry distinct traversal indices; the input order is
    /// otherwise irrelevant.
    ///
    /// # Errors
    ///
    /// Never fails today; the `Result` mirrors [`Self::find_groups`].
    pub fn find_groups_from_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let (groups, mut summary) = self.group_records(files);
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }

    /// Phases 1 and 2 over collected records.
    fn group_records(&self, files: Vec<FileRecord>) -> (Vec<DuplicateGroup>, ScanSummary) {
        let mut summary = ScanSummary::default();

        log::info!("Phase 1: Grouping by size...");
        let (size_buckets, size_stats) = group_by_size(files);
        summary.total_files = size_stats.total_files;
        summary.total_size = size_stats.total_size;
        summary.eliminated_by_size = size_stats.eliminated_unique;

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            format_size(summary.total_size)
        );

        if size_buckets.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            return (Vec::new(), summary);
        }

        let candidates: Vec<FileRecord> = size_buckets
            .into_iter()
            .flat_map(|bucket| bucket.files)
            .collect();

        log::info!("Phase 2: Hashing {} candidates", candidates.len());
        let results = self.hash_candidates(candidates);

        let mut by_digest: HashMap<(u64, Digest), Vec<FileRecord>> = HashMap::new();
        for (file, result) in results {
            match result {
                Ok(digest) => {
                    summary.hashed_files += 1;
                    by_digest.entry((file.size, digest)).or_default().push(file);
                }
                Err(e) => {
                    summary.hash_failures += 1;
                    self.config
                        .audit
                        .warn(&format!("Skipping unhashable file {}: {}", e.path().display(), e));
                    summary.scan_errors.push(ScanError::Hash(e));
                }
            }
        }

        let mut groups: Vec<DuplicateGroup> = by_digest
            .into_iter()
            .filter(|(_, files)| files.len() > 1)
            .map(|((size, digest), files)| DuplicateGroup::new(digest, size, files))
            .collect();
        groups.sort_by_key(|g| g.original().map_or(usize::MAX, |f| f.index));

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();

        log::info!(
            "Scan complete: {} duplicate groups, {} duplicate files, {} reclaimable, {} hash failures",
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display(),
            summary.hash_failures
        );

        (groups, summary)
    }

    /// Hash candidates, returning results in input order.
    fn hash_candidates(
        &self,
        candidates: Vec<FileRecord>,
    ) -> Vec<(FileRecord, Result<Digest, HashError>)> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("hashing", candidates.len());
        }

        let completed = AtomicUsize::new(0);
        let hash_one = |file: FileRecord| {
            if file.size > LARGE_FILE_THRESHOLD {
                log::debug!(
                    "Hashing large file ({}): {}",
                    format_size(file.size),
                    file.path.display()
                );
            }

            let result = self.hasher.digest(&file.path);
            if let Err(ref e) = result {
                log::warn!("Failed to hash {}: {}", file.path.display(), e);
            }

            if let Some(ref callback) = self.config.progress_callback {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                callback.on_progress(done, &file.path.to_string_lossy());
                callback.on_item_completed(file.size);
            }
            (file, result)
        };

        let results: Vec<(FileRecord, Result<Digest, HashError>)> = if self.config.io_threads > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.io_threads)
                .build()
            {
                Ok(pool) => pool.install(|| candidates.into_par_iter().map(hash_one).collect()),
                Err(e) => {
                    log::warn!("Failed to create hashing thread pool, hashing sequentially: {e}");
                    candidates.into_iter().map(hash_one).collect()
                }
            }
        } else {
            candidates.into_iter().map(hash_one).collect()
        };

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("hashing");
        }

        results
    }
}
