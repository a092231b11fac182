//! Protected-path guard for destructive operations.
//!
//! # Overview
//!
//! Every operation that scans or mutates a caller-supplied root asks the
//! [`PathGuard`] first. The guard resolves the target to its canonical form
//! (following symlinks and junctions) and refuses anything that is equal to,
//! or nested under, a directory in the [`ProtectedRootSet`].
//!
//! Resolution failures are treated as unsafe: a path that cannot be resolved
//! cannot be proven to live outside the protected set.
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::safety::{PathGuard, ProtectedRootSet};
//! use std::path::{Path, PathBuf};
//!
//! let guard = PathGuard::new(ProtectedRootSet::new(vec![PathBuf::from("/usr")]));
//!
//! assert!(!guard.is_safe(Path::new("/usr/lib")));
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Reasons a path was refused by the guard.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The path could not be canonicalized (missing, broken link, no access).
    #[error("cannot resolve {path}: {source}")]
    Unresolvable {
        /// Path as supplied by the caller
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The resolved path lies inside a protected root.
    #[error("{path} is inside protected directory {root}")]
    Protected {
        /// Resolved path that was refused
        path: PathBuf,
        /// Protected root that contains it
        root: PathBuf,
    },
}

impl GuardError {
    /// Path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unresolvable { path, .. } | Self::Protected { path, .. } => path,
        }
    }
}

/// Immutable set of resolved directories that must never be scanned or mutated.
#[derive(Debug, Clone, Default)]
pub struct ProtectedRootSet {
    roots: Vec<PathBuf>,
}

impl ProtectedRootSet {
    /// Build the set, resolving each entry.
    ///
    /// Entries that cannot be canonicalized (for example a directory that
    /// does not exist on this machine) are kept verbatim so the prefix still
    /// applies should the directory appear later.
    #[must_use]
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut resolved: Vec<PathBuf> = Vec::new();
        for root in roots {
            let root = match root.canonicalize() {
                Ok(p) => p,
                Err(e) => {
                    log::debug!(
                        "Protected root {} not resolvable ({}), keeping as given",
                        root.display(),
                        e
                    );
                    root
                }
            };
            if !resolved.contains(&root) {
                resolved.push(root);
            }
        }
        Self { roots: resolved }
    }

    /// The resolved protected roots.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Number of protected roots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find the protected root containing an already-resolved path.
    #[must_use]
    pub fn containing(&self, resolved: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .find(|root| is_within(resolved, root))
            .map(PathBuf::as_path)
    }
}

/// Component-wise prefix test.
///
/// Windows paths compare case-insensitively.
fn is_within(path: &Path, root: &Path) -> bool {
    if cfg!(windows) {
        let p = PathBuf::from(path.to_string_lossy().to_lowercase());
        let r = PathBuf::from(root.to_string_lossy().to_lowercase());
        p.starts_with(r)
    } else {
        path.starts_with(root)
    }
}

/// Decides whether a filesystem path may be scanned or mutated.
#[derive(Debug, Clone, Default)]
pub struct PathGuard {
    protected: ProtectedRootSet,
}

impl PathGuard {
    /// Create a guard over the given protected roots.
    #[must_use]
    pub fn new(protected: ProtectedRootSet) -> Self {
        Self { protected }
    }

    /// The protected roots this guard enforces.
    #[must_use]
    pub fn protected(&self) -> &ProtectedRootSet {
        &self.protected
    }

    /// Resolve `target` and verify it lies outside every protected root.
    ///
    /// Returns the canonical path on success.
    ///
    /// # Errors
    ///
    /// - `Unresolvable` if the path cannot be canonicalized
    /// - `Protected` if it equals or descends from a protected root
    pub fn check(&self, target: &Path) -> Result<PathBuf, GuardError> {
        let resolved = target
            .canonicalize()
            .map_err(|source| GuardError::Unresolvable {
                path: target.to_path_buf(),
                source,
            })?;

        if let Some(root) = self.protected.containing(&resolved) {
            return Err(GuardError::Protected {
                path: resolved,
                root: root.to_path_buf(),
            });
        }

        Ok(resolved)
    }

    /// Whether `target` may be scanned or mutated. Fails closed.
    #[must_use]
    pub fn is_safe(&self, target: &Path) -> bool {
        match self.check(target) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Path guard refused {}: {}", target.display(), e);
                false
            }
        }
    }
}

/// Platform system directories protected when no configuration overrides them.
#[must_use]
pub fn default_protected_roots() -> Vec<PathBuf> {
    #[cfg(windows)]
    {
        let lookup = |var: &str, fallback: &str| {
            std::env::var_os(var)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(fallback))
        };
        vec![
            lookup("WINDIR", r"C:\Windows"),
            lookup("PROGRAMFILES", r"C:\Program Files"),
            lookup("PROGRAMFILES(X86)", r"C:\Program Files (x86)"),
        ]
    }

    #[cfg(not(windows))]
    {
        let mut roots: Vec<PathBuf> = [
            "/bin", "/boot", "/dev", "/etc", "/lib", "/proc", "/sbin", "/sys", "/usr",
        ]
        .iter()
        .map(PathBuf::from)
        .collect();
        if cfg!(target_os = "macos") {
            roots.push(PathBuf::from("/System"));
        }
        roots
    }
}
