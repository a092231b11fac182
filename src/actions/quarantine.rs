//! Quarantine of confirmed duplicates.
//!
//! # Overview
//!
//! [`QuarantineMover`] runs the whole dedupe flow over one root:
//! 1. validate the root (missing / not a directory is a caller error)
//! 2. ask the [`PathGuard`]; a refused root is audit-logged and reported
//!    as blocked with all-zero counts, before any scan activity
//! 3. find duplicate groups
//! 4. move every member after the original into `<root>/<quarantine_dir>/`
//!    through [`safe_move`] with `_N` collision suffixes
//!
//! Per-file failures are counted and audit-logged, and the batch carries
//! on. The quarantine directory is pruned from every scan, so running the
//! mover twice moves nothing the second time.
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::actions::quarantine::QuarantineMover;
//! use tidyfs::duplicates::FinderConfig;
//! use tidyfs::safety::{default_protected_roots, PathGuard, ProtectedRootSet};
//! use std::path::Path;
//!
//! let guard = PathGuard::new(ProtectedRootSet::new(default_protected_roots()));
//! let mover = QuarantineMover::new(guard, FinderConfig::default());
//! let stats = mover.run(Path::new("/home/user/Downloads")).unwrap();
//! println!("{}", stats.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::relocate::{safe_move, MoveError, MoveFailure, MoveOutcome, SuffixStyle, UniqueNamer};
use crate::audit::AuditLog;
use crate::duplicates::{
    format_size, validate_root, DuplicateFinder, FinderConfig, FinderError, DEFAULT_QUARANTINE_DIR,
};
use crate::safety::{GuardError, PathGuard};

/// Aggregated result of one quarantine run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuarantineStats {
    /// Confirmed duplicate groups
    pub groups_found: usize,
    /// Members after the original, across all groups
    pub duplicates_found: usize,
    /// Files moved (or, in dry run, that would be moved)
    pub moved_count: usize,
    /// Bytes moved out of the tree
    pub bytes_reclaimed: u64,
    /// Moves that failed; the source stayed in place
    pub failures: usize,
    /// Candidates excluded because they could not be hashed
    pub hash_failures: usize,
    /// The root was refused by the path guard
    pub blocked: bool,
    /// Nothing was touched on disk
    pub dry_run: bool,
    /// Per-file results in processing order
    pub outcomes: Vec<MoveOutcome>,
}

impl QuarantineStats {
    /// Stats for a root refused by the guard.
    #[must_use]
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::default()
        }
    }

    /// Check if every attempted move succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures == 0
    }

    /// Human-readable summary of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.blocked {
            return "Blocked: target is inside a protected directory".to_string();
        }
        let verb = if self.dry_run { "Would move" } else { "Moved" };
        if self.all_succeeded() {
            format!(
                "{} {} of {} duplicate(s) in {} group(s), reclaiming {}",
                verb,
                self.moved_count,
                self.duplicates_found,
                self.groups_found,
                format_size(self.bytes_reclaimed)
            )
        } else {
            format!(
                "{} {} of {} duplicate(s) in {} group(s), {} failed, reclaiming {}",
                verb,
                self.moved_count,
                self.duplicates_found,
                self.groups_found,
                self.failures,
                format_size(self.bytes_reclaimed)
            )
        }
    }
}

/// Relocates confirmed duplicates into a review directory under the root.
pub struct QuarantineMover {
    guard: PathGuard,
    finder_config: FinderConfig,
    quarantine_dir: String,
    namer: UniqueNamer,
    dry_run: bool,
    audit: Arc<AuditLog>,
}

impl QuarantineMover {
    /// Create a mover.
    ///
    /// The quarantine directory name comes from `finder_config`
    /// (`Duplicate_Review` if unset) and is always pruned from the scan.
    #[must_use]
    pub fn new(guard: PathGuard, mut finder_config: FinderConfig) -> Self {
        let quarantine_dir = finder_config
            .quarantine_dir
            .get_or_insert_with(|| DEFAULT_QUARANTINE_DIR.to_string())
            .clone();
        let audit = finder_config.audit.clone();
        Self {
            guard,
            finder_config,
            quarantine_dir,
            namer: UniqueNamer::new(SuffixStyle::Underscore),
            dry_run: false,
            audit,
        }
    }

    /// Report planned moves without touching disk.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Name of the quarantine subdirectory.
    #[must_use]
    pub fn quarantine_dir(&self) -> &str {
        &self.quarantine_dir
    }

    /// Run the dedupe flow over `root`.
    ///
    /// # Errors
    ///
    /// Only a root that is missing or not a directory is an error. A root
    /// refused by the guard returns `Ok` with [`QuarantineStats::blocked`].
    pub fn run(&self, root: &Path) -> Result<QuarantineStats, FinderError> {
        validate_root(root)?;

        let root = match self.guard.check(root) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.audit.error(&format!(
                    "SECURITY VIOLATION: refusing to scan {}: {}",
                    root.display(),
                    e
                ));
                return Ok(QuarantineStats::blocked());
            }
        };

        let mut finder_config = self.finder_config.clone();
        finder_config.walker_config = finder_config
            .walker_config
            .with_protected_roots(self.guard.protected().clone());
        let finder = DuplicateFinder::new(finder_config);
        let (groups, summary) = finder.find_groups(&root)?;

        let mut stats = QuarantineStats {
            groups_found: groups.len(),
            duplicates_found: summary.duplicate_files,
            hash_failures: summary.hash_failures,
            dry_run: self.dry_run,
            ..QuarantineStats::default()
        };

        self.audit.info(&format!(
            "Scanned {}: {} duplicate group(s), {} duplicate file(s)",
            root.display(),
            stats.groups_found,
            stats.duplicates_found
        ));

        if groups.is_empty() {
            return Ok(stats);
        }

        let quarantine = root.join(&self.quarantine_dir);
        if !self.dry_run {
            // Per-file moves retry the creation and report their own failure.
            if let Err(e) = fs::create_dir_all(&quarantine) {
                log::warn!(
                    "Cannot create quarantine directory {}: {}",
                    quarantine.display(),
                    e
                );
            }
        }

        let progress = self.finder_config.progress_callback.as_ref();
        if let Some(callback) = progress {
            callback.on_phase_start("moving", stats.duplicates_found);
        }

        let mut planned: HashSet<PathBuf> = HashSet::new();
        let mut processed = 0;
        for group in &groups {
            if let Some(original) = group.original() {
                log::debug!(
                    "Keeping original {} ({} copies)",
                    original.path.display(),
                    group.duplicate_count()
                );
            }
            for dup in group.duplicates() {
                let (outcome, size) = self.quarantine_one(&dup.path, &quarantine, &mut planned);
                processed += 1;
                if let Some(callback) = progress {
                    callback.on_progress(processed, &dup.path.to_string_lossy());
                }
                match &outcome {
                    MoveOutcome::Moved { from, to } => {
                        stats.moved_count += 1;
                        stats.bytes_reclaimed += size;
                        if !self.dry_run {
                            self.audit.info(&format!(
                                "Moved duplicate: {} -> {}",
                                from.display(),
                                to.display()
                            ));
                        }
                    }
                    MoveOutcome::Failed { path, reason } => {
                        stats.failures += 1;
                        self.audit.error(&format!(
                            "Failed to move duplicate {}: {}",
                            path.display(),
                            reason
                        ));
                    }
                }
                stats.outcomes.push(outcome);
            }
        }

        if let Some(callback) = progress {
            callback.on_phase_end("moving");
        }
        log::info!("{}", stats.summary());
        Ok(stats)
    }

    /// Move (or plan to move) one duplicate, returning its outcome and size.
    fn quarantine_one(
        &self,
        path: &Path,
        quarantine: &Path,
        planned: &mut HashSet<PathBuf>,
    ) -> (MoveOutcome, u64) {
        if let Err(e) = self.guard.check(path) {
            self.audit.error(&format!(
                "SECURITY VIOLATION: refusing to move {}: {}",
                path.display(),
                e
            ));
            let reason = match e {
                GuardError::Protected { .. } => MoveFailure::Protected,
                GuardError::Unresolvable { source, .. } => {
                    MoveError::from_io(path, source).failure()
                }
            };
            return (
                MoveOutcome::Failed {
                    path: path.to_path_buf(),
                    reason,
                },
                0,
            );
        }

        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                let err = MoveError::from_io(path, e);
                return (MoveOutcome::from_result(path, &Err(err)), 0);
            }
        };

        if self.dry_run {
            let Some(name) = path.file_name() else {
                return (
                    MoveOutcome::Failed {
                        path: path.to_path_buf(),
                        reason: MoveFailure::Io("path has no file name".into()),
                    },
                    0,
                );
            };
            let to = self
                .namer
                .resolve_reserved(&quarantine.join(name), planned);
            planned.insert(to.clone());
            return (
                MoveOutcome::Moved {
                    from: path.to_path_buf(),
                    to,
                },
                size,
            );
        }

        let result = safe_move(path, quarantine, &self.namer);
        (MoveOutcome::from_result(path, &result), size)
    }
}
