//! Append-only audit log of filesystem mutations.
//!
//! Every event is written as one human-readable line:
//!
//! ```text
//! 2024-05-01 14:03:22 - INFO - Moved duplicate: /data/b.txt -> /data/Duplicate_Review/b.txt
//! ```
//!
//! The file is opened in append mode and never truncated. Each event is
//! also mirrored to the `log` facade under the `audit` target, so a
//! [`AuditLog::disabled`] sink still shows up in console diagnostics.
//!
//! Write failures never interrupt the operation being audited; they are
//! reported once through `log::warn!` and the entry is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Local};

use crate::logging::AUDIT_TARGET;

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    /// Routine event (move, deletion, scan summary)
    Info,
    /// Recoverable per-file problem
    Warning,
    /// Failed mutation or security violation
    Error,
}

impl AuditLevel {
    /// Level name as written to the log file.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    fn log_level(self) -> log::Level {
        match self {
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

/// Errors opening the audit log.
#[derive(thiserror::Error, Debug)]
pub enum AuditError {
    /// The log file or its parent directory could not be created.
    #[error("Cannot open audit log {path}: {source}")]
    Open {
        /// Log file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Append-only, timestamped event sink.
#[derive(Debug)]
pub struct AuditLog {
    path: Option<PathBuf>,
    file: Mutex<Option<File>>,
}

impl AuditLog {
    /// Open (or create) the audit log at `path` in append mode.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError::Open`] if the file cannot be opened for appending.
    pub fn open(path: &Path) -> Result<Self, AuditError> {
        let open_err = |source| AuditError::Open {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_err)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(open_err)?;

        log::debug!("Audit log opened at {}", path.display());

        Ok(Self {
            path: Some(path.to_path_buf()),
            file: Mutex::new(Some(file)),
        })
    }

    /// A sink that only mirrors events to the `log` facade.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            path: None,
            file: Mutex::new(None),
        }
    }

    /// Path of the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether events are persisted to a file.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Record one event.
    pub fn record(&self, level: AuditLevel, message: &str) {
        log::log!(target: AUDIT_TARGET, level.log_level(), "{message}");

        let Ok(mut guard) = self.file.lock() else {
            return;
        };
        let Some(file) = guard.as_mut() else {
            return;
        };

        let line = format_line(&Local::now(), level, message);
        if let Err(e) = file.write_all(line.as_bytes()).and_then(|()| file.flush()) {
            log::warn!("Audit log write failed, disabling file sink: {e}");
            *guard = None;
        }
    }

    /// Record an informational event.
    pub fn info(&self, message: &str) {
        self.record(AuditLevel::Info, message);
    }

    /// Record a warning.
    pub fn warn(&self, message: &str) {
        self.record(AuditLevel::Warning, message);
    }

    /// Record an error.
    pub fn error(&self, message: &str) {
        self.record(AuditLevel::Error, message);
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Render one log line, newline included.
#[must_use]
pub fn format_line(timestamp: &DateTime<Local>, level: AuditLevel, message: &str) -> String {
    format!(
        "{} - {} - {}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        level.as_str(),
        message
    )
}
