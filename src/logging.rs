//! Console logging for tidyfs.
//!
//! Diagnostics go through the `log` facade with an `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (errors, plus audit warnings) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Audit events are mirrored to the console under the [`AUDIT_TARGET`]
//! target and tagged `[audit]`, so a move or a refused root is visible even
//! when the audit file is disabled.
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: timestamp, level, and (with `-v`) the module path
//! - **Release builds**: level and message only
//!
//! # Example
//!
//! ```rust,no_run
//! use tidyfs::logging::init_logging;
//!
//! // -v
//! init_logging(1, false);
//! log::debug!("Debug info here");
//! ```

use env_logger::Builder;
use log::{LevelFilter, Record};
use std::env;
use std::io::Write;

/// Log target used for audit events.
pub const AUDIT_TARGET: &str = "audit";

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once at startup. A second call is ignored with a debug message;
/// `env_logger` can only be installed once per process.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors and audit warnings (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let use_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
        if quiet {
            builder.filter(Some(AUDIT_TARGET), LevelFilter::Warn);
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
        return;
    }

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG environment variable: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!(
            "Logging initialized at level: {:?}",
            determine_level(verbose, quiet)
        );
    }
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Tag prepended to a record: `[audit]` for audit events, the module path
/// when verbose, nothing otherwise.
fn record_tag(record: &Record<'_>, verbose: u8) -> Option<String> {
    if record.target() == AUDIT_TARGET {
        Some(format!("[{AUDIT_TARGET}] "))
    } else if verbose >= 1 {
        Some(format!("[{}] ", record.module_path().unwrap_or("unknown")))
    } else {
        None
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let level_style = buf.default_level_style(level);
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} {}{}",
                timestamp,
                level,
                record_tag(record, verbose).unwrap_or_default(),
                record.args()
            )
        });
    }

    #[cfg(not(debug_assertions))]
    {
        builder.format(move |buf, record| {
            let level = record.level();
            let level_style = buf.default_level_style(level);
            let tag = if record.target() == AUDIT_TARGET {
                record_tag(record, verbose).unwrap_or_default()
            } else {
                String::new()
            };
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}{}",
                level,
                tag,
                record.args()
            )
        });
    }
}

/// Get the current log level as a string.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
