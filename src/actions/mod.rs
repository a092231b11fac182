//! File actions module.
//!
//! This module provides the operations that mutate the filesystem:
//! - Collision-safe relocation shared by every mover
//! - Quarantine of confirmed duplicates
//! - Extension-based categorizing
//! - Temp directory cleanup
//! - Empty directory sweeping
//!
//! # Relocation
//!
//! Any component that moves a file goes through
//! [`relocate::safe_move`], which creates the destination directory, picks
//! a free name with a [`relocate::UniqueNamer`] and falls back to copy+remove
//! across devices.
//!
//! ```no_run
//! use tidyfs::actions::relocate::{safe_move, SuffixStyle, UniqueNamer};
//! use std::path::Path;
//!
//! let namer = UniqueNamer::new(SuffixStyle::Underscore);
//! let dest = safe_move(Path::new("/data/b.txt"), Path::new("/data/Duplicate_Review"), &namer);
//! ```
//!
//! # Guarded roots
//!
//! Quarantine, organize and sweep all consult the
//! [`PathGuard`](crate::safety::PathGuard) on their root first and report
//! `blocked` without touching anything when it refuses.

pub mod organize;
pub mod quarantine;
pub mod relocate;
pub mod sweep;
pub mod temp;

pub use organize::{OrganizeConfig, OrganizeStats, Organizer};
pub use quarantine::{QuarantineMover, QuarantineStats};
pub use relocate::{safe_move, MoveError, MoveFailure, MoveOutcome, SuffixStyle, UniqueNamer};
pub use sweep::{SweepStats, Sweeper};
pub use temp::{TempCleanStats, TempCleaner};
