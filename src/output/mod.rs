//! Output formatters for command results.
//!
//! Every subcommand produces a [`Report`]. It is printed either as colored
//! text ([`text`]) or as JSON ([`json`]) for automation and scripting.
//!
//! # Example
//!
//! ```no_run
//! use tidyfs::actions::quarantine::QuarantineMover;
//! use tidyfs::duplicates::FinderConfig;
//! use tidyfs::output::{json::JsonOutput, Report};
//! use tidyfs::safety::PathGuard;
//! use std::path::Path;
//!
//! let mover = QuarantineMover::new(PathGuard::default(), FinderConfig::default());
//! let report = Report::Dedupe(mover.run(Path::new(".")).unwrap());
//!
//! println!("{}", JsonOutput::new(&report).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

use serde::Serialize;

use crate::actions::{OrganizeStats, QuarantineStats, SweepStats, TempCleanStats};
use crate::error::ExitCode;

pub use json::{JsonOutput, JsonOutputError};
pub use text::render_text;

/// The result of one subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Report {
    /// `dedupe`
    Dedupe(QuarantineStats),
    /// `organize`
    Organize(OrganizeStats),
    /// `clean-temp`
    CleanTemp(TempCleanStats),
    /// `sweep`
    Sweep(SweepStats),
}

impl Report {
    /// Subcommand name as typed on the command line.
    #[must_use]
    pub fn command(&self) -> &'static str {
        match self {
            Self::Dedupe(_) => "dedupe",
            Self::Organize(_) => "organize",
            Self::CleanTemp(_) => "clean-temp",
            Self::Sweep(_) => "sweep",
        }
    }

    /// Process exit code for this result.
    ///
    /// A dry run changes nothing on disk, so it is never a success: with
    /// no failures it reports [`ExitCode::NothingToDo`]. A temp cleanup is
    /// best effort: locked items are expected, so skips never make it a
    /// partial success.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        let applied = |dry_run: bool, count: usize| if dry_run { 0 } else { count };
        match self {
            Self::Dedupe(s) => ExitCode::from_counts(
                s.blocked,
                applied(s.dry_run, s.moved_count),
                s.failures,
            ),
            Self::Organize(s) => ExitCode::from_counts(s.blocked, s.moved, s.failures),
            Self::CleanTemp(s) => ExitCode::from_counts(false, s.deleted, 0),
            Self::Sweep(s) => {
                ExitCode::from_counts(s.blocked, applied(s.dry_run, s.removed), s.failures)
            }
        }
    }
}
