//! Extension-based categorizer.
//!
//! A single, non-recursive pass over a root directory. Each regular file
//! whose lower-cased extension appears in the category table moves into
//! `<root>/<Category>/`. Archives and installers that match no category move
//! into `<root>/<archive_folder>/<file stem>/`. Everything else stays put.
//!
//! Directories, hidden files and files without an extension are skipped.
//! Every move goes through [`safe_move`] with ` (N)` collision suffixes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::relocate::{safe_move, MoveOutcome, SuffixStyle, UniqueNamer};
use crate::audit::AuditLog;
use crate::duplicates::{validate_root, FinderError};
use crate::safety::PathGuard;
use crate::scanner::walker::is_hidden;

/// Default folder for archives and installers.
pub const DEFAULT_ARCHIVE_FOLDER: &str = "ZFolders";

/// Built-in category table: folder name -> extensions (no dot, lower case).
#[must_use]
pub fn default_categories() -> BTreeMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 3] = [
        (
            "Images",
            &[
                "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "svg", "heic", "ico",
                "raw",
            ],
        ),
        (
            "Documents",
            &[
                "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "csv", "odt",
                "ods", "odp", "md",
            ],
        ),
        (
            "Softwares",
            &["exe", "msi", "bat", "cmd", "ps1", "apk", "jar", "com"],
        ),
    ];

    table
        .iter()
        .map(|(name, exts)| {
            (
                (*name).to_string(),
                exts.iter().map(|e| (*e).to_string()).collect(),
            )
        })
        .collect()
}

/// Built-in archive/installer extensions routed to the archive folder.
#[must_use]
pub fn default_archive_extensions() -> Vec<String> {
    ["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso", "exe", "msi"]
        .iter()
        .map(|e| (*e).to_string())
        .collect()
}

/// Categorizer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizeConfig {
    /// Category folder -> extensions
    pub categories: BTreeMap<String, Vec<String>>,
    /// Folder under the root that receives archives
    pub archive_folder: String,
    /// Extensions routed to the archive folder when no category matches
    pub archive_extensions: Vec<String>,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            archive_folder: DEFAULT_ARCHIVE_FOLDER.to_string(),
            archive_extensions: default_archive_extensions(),
        }
    }
}

/// Where a file should go, relative to the organized root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Into a category folder
    Category(String),
    /// Into `<archive_folder>/<stem>/`
    Archive(PathBuf),
    /// Nowhere
    Stay,
}

impl OrganizeConfig {
    /// Decide the placement of a file by its name.
    #[must_use]
    pub fn placement(&self, file: &Path) -> Placement {
        let Some(ext) = file
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty())
        else {
            return Placement::Stay;
        };
        let matches = |list: &[String]| {
            list.iter()
                .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        };

        if let Some((category, _)) = self
            .categories
            .iter()
            .find(|(_, exts)| matches(exts.as_slice()))
        {
            return Placement::Category(category.clone());
        }

        if matches(self.archive_extensions.as_slice()) {
            let stem = file.file_stem().unwrap_or_default();
            return Placement::Archive(Path::new(&self.archive_folder).join(stem));
        }

        Placement::Stay
    }
}

/// Result of one organize pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeStats {
    /// Files moved into a category or archive folder
    pub moved: usize,
    /// Moves that failed; the file stayed in place
    pub failures: usize,
    /// Files left alone (hidden, no extension, unknown extension)
    pub skipped: usize,
    /// The root was refused by the path guard
    pub blocked: bool,
    /// Per-file results in processing order
    pub outcomes: Vec<MoveOutcome>,
}

/// Moves files into category folders.
pub struct Organizer {
    guard: PathGuard,
    config: OrganizeConfig,
    namer: UniqueNamer,
    audit: Arc<AuditLog>,
}

impl Organizer {
    /// Create an organizer.
    #[must_use]
    pub fn new(guard: PathGuard, config: OrganizeConfig) -> Self {
        Self {
            guard,
            config,
            namer: UniqueNamer::new(SuffixStyle::Parenthesized),
            audit: Arc::new(AuditLog::disabled()),
        }
    }

    /// Set the audit log.
    #[must_use]
    pub fn with_audit_log(mut self, audit: Arc<AuditLog>) -> Self {
        self.audit = audit;
        self
    }

    /// Organize the top level of `root`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if `root` is missing, not a directory, or
    /// cannot be listed.
    pub fn run(&self, root: &Path) -> Result<OrganizeStats, FinderError> {
        validate_root(root)?;

        let root = match self.guard.check(root) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.audit.error(&format!(
                    "SECURITY VIOLATION: refusing to organize {}: {}",
                    root.display(),
                    e
                ));
                return Ok(OrganizeStats {
                    blocked: true,
                    ..OrganizeStats::default()
                });
            }
        };

        log::info!("Organizing {}", root.display());

        let mut entries: Vec<PathBuf> = fs::read_dir(&root)?
            .filter_map(|entry| match entry {
                Ok(e) => Some(e.path()),
                Err(e) => {
                    log::warn!("Cannot read entry in {}: {}", root.display(), e);
                    None
                }
            })
            .collect();
        entries.sort();

        let mut stats = OrganizeStats::default();
        for path in entries {
            let Ok(metadata) = fs::metadata(&path) else {
                stats.skipped += 1;
                continue;
            };
            if metadata.is_dir() {
                continue;
            }
            let hidden = fs::symlink_metadata(&path)
                .map(|m| is_hidden(&path, &m))
                .unwrap_or(false);
            if hidden {
                log::trace!("Skipping hidden file: {}", path.display());
                stats.skipped += 1;
                continue;
            }

            let dest_dir = match self.config.placement(&path) {
                Placement::Category(name) => root.join(name),
                Placement::Archive(relative) => root.join(relative),
                Placement::Stay => {
                    stats.skipped += 1;
                    continue;
                }
            };

            let result = safe_move(&path, &dest_dir, &self.namer);
            let outcome = MoveOutcome::from_result(&path, &result);
            match &outcome {
                MoveOutcome::Moved { from, to } => {
                    stats.moved += 1;
                    self.audit
                        .info(&format!("Organized: {} -> {}", from.display(), to.display()));
                }
                MoveOutcome::Failed { path, reason } => {
                    stats.failures += 1;
                    self.audit
                        .error(&format!("Failed to organize {}: {}", path.display(), reason));
                }
            }
            stats.outcomes.push(outcome);
        }

        log::info!(
            "Organize complete: {} moved, {} failed, {} skipped",
            stats.moved,
            stats.failures,
            stats.skipped
        );
        Ok(stats)
    }
}
