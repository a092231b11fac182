//! Temporary-file eviction.
//!
//! Each configured temp directory is walked bottom-up: files are deleted,
//! directories are removed only once empty, and the temp roots themselves
//! are left in place. Items that are locked or not ours to delete are
//! skipped quietly; temp directories always contain a few.
//!
//! Temp directories are explicit configuration. They are not run through
//! the path guard, since the Windows system temp lives under `%WINDIR%`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use walkdir::WalkDir;

use crate::audit::AuditLog;

/// Platform temp directories cleaned when no configuration overrides them.
#[must_use]
pub fn default_temp_dirs() -> Vec<PathBuf> {
    #[cfg(windows)]
    {
        let windir = std::env::var_os("WINDIR")
            .map_or_else(|| PathBuf::from(r"C:\Windows"), PathBuf::from);
        let local = std::env::var_os("LOCALAPPDATA")
            .map_or_else(|| PathBuf::from(r"C:\Users\Default\AppData\Local"), PathBuf::from);
        vec![windir.join("Temp"), local.join("Temp")]
    }
    #[cfg(not(windows))]
    {
        vec![std::env::temp_dir()]
    }
}

/// Result of a temp cleanup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TempCleanStats {
    /// Files and directories removed
    pub deleted: usize,
    /// Bytes held by the removed files
    pub bytes_freed: u64,
    /// Items that could not be removed
    pub skipped: usize,
}

/// Deletes the contents of temp directories.
pub struct TempCleaner {
    dirs: Vec<PathBuf>,
    audit: Arc<AuditLog>,
}

impl TempCleaner {
    /// Create a cleaner over the given directories.
    #[must_use]
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            audit: Arc::new(AuditLog::disabled()),
        }
    }

    /// Set the audit log.
    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// The directories this cleaner empties.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Clean every configured directory that exists.
    #[must_use]
    pub fn run(&self) -> TempCleanStats {
        let mut stats = TempCleanStats::default();
        for dir in &self.dirs {
            if !dir.is_dir() {
                log::debug!("Temp directory {} does not exist, skipping", dir.display());
                continue;
            }
            log::info!("Cleaning temp directory {}", dir.display());
            self.clean_dir(dir, &mut stats);
        }

        log::info!(
            "Temp cleanup complete: {} items removed, {} freed",
            stats.deleted,
            crate::duplicates::format_size(stats.bytes_freed)
        );
        stats
    }

    fn clean_dir(&self, dir: &Path, stats: &mut TempCleanStats) {
        for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::debug!("Skipping unreadable temp entry: {e}");
                    stats.skipped += 1;
                    continue;
                }
            };
            let path = entry.path();

            if entry.file_type().is_dir() {
                match fs::remove_dir(path) {
                    Ok(()) => {
                        stats.deleted += 1;
                        self.audit
                            .info(&format!("Deleted temp item: {}", path.display()));
                    }
                    Err(e) => {
                        log::debug!("Keeping temp directory {}: {}", path.display(), e);
                        stats.skipped += 1;
                    }
                }
                continue;
            }

            let size = entry
                .metadata()
                .ok()
                .filter(std::fs::Metadata::is_file)
                .map_or(0, |m| m.len());
            match fs::remove_file(path) {
                Ok(()) => {
                    stats.deleted += 1;
                    stats.bytes_freed += size;
                    self.audit
                        .info(&format!("Deleted temp item: {}", path.display()));
                }
                Err(e) => {
                    log::debug!("Skipping locked temp file {}: {}", path.display(), e);
                    stats.skipped += 1;
                }
            }
        }
    }
}
