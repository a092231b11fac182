//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Full content hashing of size-collided candidates (Phase 2)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    format_size, validate_root, DuplicateFinder, FinderConfig, FinderError, ScanSummary,
    DEFAULT_QUARANTINE_DIR,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeBucket};
