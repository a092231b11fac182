//! Collision-safe file relocation.
//!
//! # Overview
//!
//! Every component that relocates a file goes through [`safe_move`]:
//! - the destination directory is created if missing
//! - the final name is chosen by a [`UniqueNamer`], so existing content is
//!   never overwritten
//! - `rename` is tried first, with a copy+remove fallback when source and
//!   destination live on different devices
//!
//! On any failure the source stays where it was.
//!
//! # Naming race
//!
//! The existence probe in [`UniqueNamer::resolve`] and the rename that
//! follows are two separate syscalls. A concurrent writer creating the same
//! name in between can still be clobbered on platforms where `rename`
//! replaces. The tool assumes it is the only writer in the target tree.
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::actions::relocate::{safe_move, SuffixStyle, UniqueNamer};
//! use std::path::Path;
//!
//! let namer = UniqueNamer::new(SuffixStyle::Parenthesized);
//! let dest = safe_move(
//!     Path::new("/home/user/Downloads/photo.jpg"),
//!     Path::new("/home/user/Downloads/Images"),
//!     &namer,
//! ).unwrap();
//! println!("Moved to {}", dest.display());
//! ```

use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Counter token format used when a name is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuffixStyle {
    /// `stem (1).ext`
    #[default]
    Parenthesized,
    /// `stem_1.ext`
    Underscore,
}

impl SuffixStyle {
    /// The token inserted between stem and extension for `counter`.
    #[must_use]
    pub fn token(self, counter: u32) -> String {
        match self {
            Self::Parenthesized => format!(" ({counter})"),
            Self::Underscore => format!("_{counter}"),
        }
    }
}

/// Picks a destination path that does not exist yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueNamer {
    style: SuffixStyle,
}

impl UniqueNamer {
    /// Create a namer with the given suffix style.
    #[must_use]
    pub fn new(style: SuffixStyle) -> Self {
        Self { style }
    }

    /// The suffix style.
    #[must_use]
    pub fn style(&self) -> SuffixStyle {
        self.style
    }

    /// Return `desired` if nothing exists there, else the first free
    /// `stem<token>.ext` for counters 1, 2, ...
    ///
    /// The extension is the part after the last dot, so `a.tar.gz` becomes
    /// `a.tar (1).gz`. Dangling symlinks count as taken.
    #[must_use]
    pub fn resolve(&self, desired: &Path) -> PathBuf {
        self.resolve_by(desired, path_taken)
    }

    /// Like [`Self::resolve`], also treating `reserved` paths as taken.
    ///
    /// Used to plan several moves into one directory without touching disk.
    #[must_use]
    pub fn resolve_reserved(&self, desired: &Path, reserved: &HashSet<PathBuf>) -> PathBuf {
        self.resolve_by(desired, |p| reserved.contains(p) || path_taken(p))
    }

    fn resolve_by(&self, desired: &Path, taken: impl Fn(&Path) -> bool) -> PathBuf {
        if !taken(desired) {
            return desired.to_path_buf();
        }

        let mut counter: u32 = 1;
        loop {
            let candidate = self.candidate(desired, counter);
            if !taken(&candidate) {
                log::trace!(
                    "Resolved {} to {}",
                    desired.display(),
                    candidate.display()
                );
                return candidate;
            }
            counter += 1;
        }
    }

    /// The path for a given counter value, whether or not it exists.
    #[must_use]
    pub fn candidate(&self, desired: &Path, counter: u32) -> PathBuf {
        let mut name = OsString::from(desired.file_stem().unwrap_or_default());
        name.push(self.style.token(counter));
        if let Some(ext) = desired.extension() {
            name.push(".");
            name.push(ext);
        }
        desired.with_file_name(name)
    }
}

fn path_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Error type for move operations.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Source file was not found (may have been moved or deleted).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied reading the source or writing the destination.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The destination directory could not be created.
    #[error("cannot create directory {dir}: {source}")]
    CreateDir {
        /// Directory that failed
        dir: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl MoveError {
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
            Self::CreateDir { dir, .. } => dir,
        }
    }

    /// Collapse into the reporting tag.
    #[must_use]
    pub fn failure(&self) -> MoveFailure {
        match self {
            Self::NotFound(_) => MoveFailure::NotFound,
            Self::PermissionDenied(_) => MoveFailure::PermissionDenied,
            Self::CreateDir { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
                MoveFailure::PermissionDenied
            }
            Self::CreateDir { .. } | Self::Io { .. } => MoveFailure::Io(self.to_string()),
        }
    }
}

/// Why a move did not happen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveFailure {
    /// Access was refused
    PermissionDenied,
    /// The source vanished
    NotFound,
    /// The source resolves inside a protected directory
    Protected,
    /// Anything else, with the error text
    Io(String),
}

impl fmt::Display for MoveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::NotFound => write!(f, "not found"),
            Self::Protected => write!(f, "inside a protected directory"),
            Self::Io(msg) => write!(f, "{msg}"),
        }
    }
}

/// Per-file result of an attempted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MoveOutcome {
    /// The file now lives at `to`.
    Moved {
        /// Original location
        from: PathBuf,
        /// Final location
        to: PathBuf,
    },
    /// The file was left at `path`.
    Failed {
        /// Source that stayed in place
        path: PathBuf,
        /// Failure tag
        reason: MoveFailure,
    },
}

impl MoveOutcome {
    /// Build an outcome from a [`safe_move`] result.
    #[must_use]
    pub fn from_result(src: &Path, result: &Result<PathBuf, MoveError>) -> Self {
        match result {
            Ok(to) => Self::Moved {
                from: src.to_path_buf(),
                to: to.clone(),
            },
            Err(e) => Self::Failed {
                path: src.to_path_buf(),
                reason: e.failure(),
            },
        }
    }

    /// Whether the move succeeded.
    #[must_use]
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }

    /// The source path.
    #[must_use]
    pub fn source(&self) -> &Path {
        match self {
            Self::Moved { from, .. } => from,
            Self::Failed { path, .. } => path,
        }
    }
}

/// Move `src` into `dest_dir` under a collision-free name.
///
/// Returns the final destination path.
///
/// # Errors
///
/// - `NotFound` if `src` is gone
/// - `CreateDir` if `dest_dir` cannot be created
/// - `PermissionDenied` / `Io` if the rename (or copy fallback) fails
///
/// In every error case `src` is left untouched.
pub fn safe_move(src: &Path, dest_dir: &Path, namer: &UniqueNamer) -> Result<PathBuf, MoveError> {
    fs::symlink_metadata(src).map_err(|e| MoveError::from_io(src, e))?;

    let file_name = src.file_name().ok_or_else(|| MoveError::Io {
        path: src.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
    })?;

    fs::create_dir_all(dest_dir).map_err(|source| MoveError::CreateDir {
        dir: dest_dir.to_path_buf(),
        source,
    })?;

    let dest = namer.resolve(&dest_dir.join(file_name));
    relocate_file(src, &dest).map_err(|e| MoveError::from_io(src, e))?;

    log::debug!("Moved {} -> {}", src.display(), dest.display());
    Ok(dest)
}

/// Rename, falling back to copy+remove across devices.
fn relocate_file(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(err) if is_cross_device_error(&err) => {
            log::debug!(
                "Cross-device move, copying {} -> {}",
                src.display(),
                dest.display()
            );
            let copied = fs::copy(src, dest).and_then(|_| fs::File::open(dest)?.sync_all());
            if let Err(copy_err) = copied {
                let _ = fs::remove_file(dest);
                return Err(copy_err);
            }
            if let Err(remove_err) = fs::remove_file(src) {
                // Keep exactly one copy, at the source.
                let _ = fs::remove_file(dest);
                return Err(remove_err);
            }
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// Whether a rename failed because source and destination are on different devices.
#[must_use]
pub fn is_cross_device_error(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }
    #[cfg(unix)]
    const CROSS_DEVICE: i32 = 18; // EXDEV
    #[cfg(windows)]
    const CROSS_DEVICE: i32 = 17; // ERROR_NOT_SAME_DEVICE
    #[cfg(not(any(unix, windows)))]
    const CROSS_DEVICE: i32 = -1;

    err.raw_os_error() == Some(CROSS_DEVICE)
}
