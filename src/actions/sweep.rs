//! Empty directory sweeper.
//!
//! Walks a guarded root bottom-up and removes every directory that is empty
//! at the moment it is visited. Children are visited before their parent,
//! so a chain of nested empty directories collapses in one live pass. The
//! root itself is never removed.
//!
//! Protected directories nested under the root are pruned from the walk.
//!
//! Dry run is the default: directories are reported, nothing is removed.
//! Because nothing is removed, a parent holding only empty children is not
//! empty at visit time and is not reported.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use walkdir::WalkDir;

use crate::audit::AuditLog;
use crate::duplicates::{validate_root, FinderError};
use crate::safety::PathGuard;

/// Result of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    /// Directories removed (or, in dry run, that would be removed)
    pub removed: usize,
    /// Directories that could not be inspected or removed
    pub failures: usize,
    /// Nothing was touched on disk
    pub dry_run: bool,
    /// The root was refused by the path guard
    pub blocked: bool,
    /// The removed (or reported) directories, deepest first
    pub directories: Vec<PathBuf>,
}

/// Removes empty directories under a root.
pub struct Sweeper {
    guard: PathGuard,
    dry_run: bool,
    audit: Arc<AuditLog>,
}

impl Sweeper {
    /// Create a sweeper. Starts in dry-run mode.
    #[must_use]
    pub fn new(guard: PathGuard) -> Self {
        Self {
            guard,
            dry_run: true,
            audit: Arc::new(AuditLog::disabled()),
        }
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the audit log.
    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Sweep `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if `root` is missing or not a directory.
    pub fn run(&self, root: &Path) -> Result<SweepStats, FinderError> {
        validate_root(root)?;

        let mut stats = SweepStats {
            dry_run: self.dry_run,
            ..SweepStats::default()
        };

        let root = match self.guard.check(root) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.audit.error(&format!(
                    "SECURITY VIOLATION: refusing to sweep {}: {}",
                    root.display(),
                    e
                ));
                stats.blocked = true;
                return Ok(stats);
            }
        };

        log::info!(
            "Sweeping empty folders under {} ({})",
            root.display(),
            if self.dry_run { "dry run" } else { "live" }
        );

        // Links are not followed, so paths under the resolved root are
        // already resolved.
        let protected = self.guard.protected();
        for entry in WalkDir::new(&root)
            .min_depth(1)
            .contents_first(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| match protected.containing(e.path()) {
                Some(p) => {
                    log::info!("Skipping protected directory {}", p.display());
                    false
                }
                None => true,
            })
        {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::error!("Could not access {}: {}", root.display(), e);
                    stats.failures += 1;
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            let dir = entry.path();
            match is_empty_dir(dir) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    self.audit
                        .error(&format!("Could not access {}: {}", dir.display(), e));
                    stats.failures += 1;
                    continue;
                }
            }

            if self.dry_run {
                log::info!("[Dry Run] Would delete: {}", dir.display());
            } else if let Err(e) = fs::remove_dir(dir) {
                self.audit
                    .error(&format!("Could not delete {}: {}", dir.display(), e));
                stats.failures += 1;
                continue;
            } else {
                self.audit
                    .info(&format!("Deleted empty folder: {}", dir.display()));
            }
            stats.removed += 1;
            stats.directories.push(dir.to_path_buf());
        }

        log::info!(
            "Sweep complete: {} {} empty folder(s)",
            if self.dry_run { "would delete" } else { "deleted" },
            stats.removed
        );
        Ok(stats)
    }
}

fn is_empty_dir(dir: &Path) -> std::io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}
