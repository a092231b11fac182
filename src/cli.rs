//! Command-line interface definitions for tidyfs.
//!
//! This module defines all CLI arguments, subcommands, and options using the clap derive API.
//! Global options (verbosity, color, config, audit log, output format) apply to
//! every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Move duplicates under ~/Downloads into ~/Downloads/Duplicate_Review
//! tidyfs dedupe ~/Downloads
//!
//! # See what would move, as JSON
//! tidyfs --output json dedupe ~/Downloads --dry-run
//!
//! # Sort the top level of a folder into category folders
//! tidyfs organize ~/Desktop
//!
//! # Remove empty folders for real
//! tidyfs sweep ~/Projects --live
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Local filesystem maintenance.
///
/// tidyfs quarantines duplicate files, sorts files into category folders,
/// empties temp directories and removes empty folders. Every destructive
/// operation refuses to run inside protected system directories.
#[derive(Debug, Parser)]
#[command(name = "tidyfs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (default: platform config dir/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Append audit events to this file instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Output format for the result summary
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for tidyfs.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move duplicate files into a review folder under the target
    Dedupe(DedupeArgs),
    /// Sort the top level of a folder into category folders
    Organize(OrganizeArgs),
    /// Delete the contents of temp directories
    CleanTemp(CleanTempArgs),
    /// Remove empty folders (dry run unless --live)
    Sweep(SweepArgs),
}

/// Arguments for the dedupe subcommand.
#[derive(Debug, Args)]
pub struct DedupeArgs {
    /// Directory to scan for duplicates
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Report what would move without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Number of I/O threads for hashing (default: from config, 1)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Name of the review folder created under PATH
    #[arg(long, value_name = "NAME")]
    pub quarantine_dir: Option<String>,

    /// Additional protected directory (can be specified multiple times)
    #[arg(long = "protect", value_name = "DIR")]
    pub protect: Vec<PathBuf>,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

/// Arguments for the organize subcommand.
#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Directory whose top-level files are sorted
    #[arg(value_name = "PATH")]
    pub path: PathBuf,
}

/// Arguments for the clean-temp subcommand.
#[derive(Debug, Args)]
pub struct CleanTempArgs {
    /// Temp directory to empty (replaces the configured list; repeatable)
    #[arg(long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,
}

/// Arguments for the sweep subcommand.
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Directory to sweep for empty folders
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Actually remove the empty folders
    #[arg(long)]
    pub live: bool,
}

/// Output format for result summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored human-readable text
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use tidyfs::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
