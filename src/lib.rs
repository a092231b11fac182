//! tidyfs - local filesystem maintenance
//!
//! Finds byte-identical files by size and SHA-256 and moves the extra
//! copies into a review folder, sorts files into category folders, empties
//! temp directories and removes empty folders. Every operation on a
//! caller-supplied root first asks a [`safety::PathGuard`], which refuses
//! protected system directories.
//!
//! # Modules
//!
//! - [`safety`]: protected roots and the path guard
//! - [`scanner`]: deterministic walking and SHA-256 hashing
//! - [`duplicates`]: size then digest grouping
//! - [`actions`]: collision-safe moves and the four operations
//! - [`audit`]: the append-only audit log
//! - [`config`], [`cli`], [`output`], [`logging`], [`progress`], [`error`]:
//!   the application around them

pub mod actions;
pub mod audit;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod safety;
pub mod scanner;

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{Organizer, QuarantineMover, Sweeper, TempCleaner};
use crate::audit::AuditLog;
use crate::cli::{Cli, Commands, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{render_text, JsonOutput, Report};
use crate::progress::{Progress, ProgressCallback};
use crate::scanner::WalkerConfig;

/// Run the application: load configuration, execute the subcommand and
/// print its report.
///
/// # Errors
///
/// Returns an error for top-level misconfiguration: an unreadable or
/// invalid config file, or a root that is missing or not a directory.
/// Per-file failures are reported in the result, not as errors.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    if cli.no_color {
        yansi::disable();
    }

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config.merge_cli(&cli);
    let audit = Arc::new(config.open_audit_log());

    let report = execute(&cli, config, audit)?;
    print_report(&report, cli.output, cli.quiet)?;
    Ok(report.exit_code())
}

/// Execute the subcommand in `cli` with an already loaded configuration.
///
/// # Errors
///
/// Returns an error if the target root is missing or not a directory, or
/// if command-line overrides fail validation.
pub fn execute(cli: &Cli, mut config: Config, audit: Arc<AuditLog>) -> anyhow::Result<Report> {
    let report = match &cli.command {
        Commands::Dedupe(args) => {
            config.merge_dedupe_args(args)?;

            let walker_config = WalkerConfig {
                follow_symlinks: args.follow_symlinks,
                skip_hidden: args.skip_hidden,
                ..WalkerConfig::default()
            }
            .with_size_range(args.min_size, args.max_size);

            let mut finder_config = config.finder_config(walker_config, audit);
            if cli.output == OutputFormat::Text && !cli.quiet {
                let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(false));
                finder_config = finder_config.with_progress_callback(progress);
            }

            let stats = QuarantineMover::new(config.path_guard(), finder_config)
                .with_dry_run(args.dry_run)
                .run(&args.path)
                .with_context(|| format!("Cannot dedupe {}", args.path.display()))?;
            Report::Dedupe(stats)
        }
        Commands::Organize(args) => {
            let stats = Organizer::new(config.path_guard(), config.organize_config())
                .with_audit_log(audit)
                .run(&args.path)
                .with_context(|| format!("Cannot organize {}", args.path.display()))?;
            Report::Organize(stats)
        }
        Commands::CleanTemp(args) => {
            let dirs = if args.dirs.is_empty() {
                config.temp_dirs
            } else {
                args.dirs.clone()
            };
            Report::CleanTemp(TempCleaner::new(dirs).with_audit_log(audit).run())
        }
        Commands::Sweep(args) => {
            let stats = Sweeper::new(config.path_guard())
                .with_dry_run(!args.live)
                .with_audit_log(audit)
                .run(&args.path)
                .with_context(|| format!("Cannot sweep {}", args.path.display()))?;
            Report::Sweep(stats)
        }
    };

    log::debug!(
        "{} finished with {}",
        report.command(),
        report.exit_code().code_prefix()
    );
    Ok(report)
}

fn print_report(report: &Report, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    match format {
        OutputFormat::Json => JsonOutput::new(report)
            .write_to(&mut handle, true)
            .context("Failed to write JSON output")?,
        OutputFormat::Text => {
            if !quiet {
                handle
                    .write_all(render_text(report).as_bytes())
                    .context("Failed to write output")?;
            }
        }
    }
    Ok(())
}
