//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the tidyfs application.
///
/// - 0: Success (work was done)
/// - 1: General error (bad root, unreadable config, unexpected failure)
/// - 2: Nothing to do (no duplicates, nothing moved or removed)
/// - 3: Partial success (some per-file operations failed)
/// - 4: Blocked (the target lies inside a protected directory)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the operation completed and changed something.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// Nothing to do: the operation completed without finding work.
    NothingToDo = 2,
    /// Partial success: completed, but some files could not be processed.
    PartialSuccess = 3,
    /// Blocked: the path guard refused the target.
    Blocked = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "TF000",
            Self::GeneralError => "TF001",
            Self::NothingToDo => "TF002",
            Self::PartialSuccess => "TF003",
            Self::Blocked => "TF004",
        }
    }

    /// Pick the exit code for a finished batch operation.
    #[must_use]
    pub fn from_counts(blocked: bool, done: usize, failures: usize) -> Self {
        if blocked {
            Self::Blocked
        } else if failures > 0 {
            Self::PartialSuccess
        } else if done == 0 {
            Self::NothingToDo
        } else {
            Self::Success
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "TF001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
