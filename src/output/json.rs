//! JSON output formatter for command results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "command": "dedupe",
//!   "exit_code": 0,
//!   "exit_code_name": "TF000",
//!   "result": {
//!     "groups_found": 1,
//!     "duplicates_found": 1,
//!     "moved_count": 1,
//!     "bytes_reclaimed": 1,
//!     "failures": 0,
//!     "hash_failures": 0,
//!     "blocked": false,
//!     "dry_run": false,
//!     "outcomes": [
//!       { "status": "moved", "from": "/d/b.txt", "to": "/d/Duplicate_Review/b.txt" }
//!     ]
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::Report;

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Subcommand that produced the result
    pub command: &'static str,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "TF000")
    pub exit_code_name: &'static str,
    /// Command-specific statistics
    pub result: &'a Report,
}

impl<'a> JsonOutput<'a> {
    /// Wrap a report.
    #[must_use]
    pub fn new(report: &'a Report) -> Self {
        let exit_code = report.exit_code();
        Self {
            command: report.command(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix(),
            result: report,
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
