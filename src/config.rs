//! Application configuration management.
//!
//! Settings are layered with figment, lowest precedence first:
//! 1. built-in defaults ([`Config::default`])
//! 2. the TOML file (`--config`, else `<config dir>/config.toml`)
//! 3. `TIDYFS_*` environment variables (`TIDYFS_IO_THREADS=4`)
//! 4. command-line flags ([`Config::merge_cli`], [`Config::merge_dedupe_args`])
//!
//! Every component receives its slice of the configuration at construction;
//! nothing here is process-global.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::organize::{
    default_archive_extensions, default_categories, OrganizeConfig, DEFAULT_ARCHIVE_FOLDER,
};
use crate::actions::temp::default_temp_dirs;
use crate::audit::AuditLog;
use crate::cli::{Cli, DedupeArgs};
use crate::duplicates::{FinderConfig, DEFAULT_QUARANTINE_DIR};
use crate::safety::{default_protected_roots, PathGuard, ProtectedRootSet};
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE, MIN_CHUNK_SIZE};

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "TIDYFS_";

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// The file or environment could not be parsed into settings.
    #[error("Invalid configuration: {0}")]
    Parse(#[source] Box<figment::Error>),

    /// Protected roots must be absolute prefixes.
    #[error("Protected root must be an absolute path: {0}")]
    RelativeProtectedRoot(PathBuf),

    /// The quarantine folder name is empty or contains a separator.
    #[error("Invalid quarantine folder name: '{0}'")]
    InvalidQuarantineDir(String),

    /// At least one hashing thread is required.
    #[error("io_threads must be at least 1")]
    ZeroIoThreads,
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Parse(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories no operation may scan or modify.
    pub protected_roots: Vec<PathBuf>,
    /// Name of the review folder created under a deduplicated root.
    pub quarantine_dir: String,
    /// Read chunk size for hashing, in bytes.
    pub chunk_size: usize,
    /// Hashing threads. 1 is sequential.
    pub io_threads: usize,
    /// Audit log file. `None` disables the file sink.
    pub audit_log: Option<PathBuf>,
    /// Directories emptied by `clean-temp`.
    pub temp_dirs: Vec<PathBuf>,
    /// Folder receiving archives and installers when organizing.
    pub archive_folder: String,
    /// Extensions routed to the archive folder.
    pub archive_extensions: Vec<String>,
    /// Category folder -> extensions.
    pub categories: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protected_roots: default_protected_roots(),
            quarantine_dir: DEFAULT_QUARANTINE_DIR.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            io_threads: 1,
            audit_log: default_audit_log_path(),
            temp_dirs: default_temp_dirs(),
            archive_folder: DEFAULT_ARCHIVE_FOLDER.to_string(),
            archive_extensions: default_archive_extensions(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit `path` must exist. A missing default file just means
    /// defaults plus environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the explicit file is missing, the merged
    /// settings cannot be parsed, or they fail [`Config::validate`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from_path(path)
            }
            None => match default_config_path() {
                Some(path) => Self::load_from_path(&path),
                None => {
                    log::debug!("No platform config directory, using defaults");
                    Self::from_figment(Figment::from(Serialized::defaults(Self::default())))
                }
            },
        }
    }

    /// Load configuration from a specific TOML file plus environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on parse or validation failure.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading configuration from {}", path.display());
        Self::from_figment(Self::figment(path))
    }

    /// The layered figment for a config file: defaults, file, environment.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let mut config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that would otherwise fail deep inside an operation.
    ///
    /// A `chunk_size` below 4 KiB is raised to 4 KiB with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for a relative protected root, an empty or
    /// nested quarantine name, or zero I/O threads.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if let Some(root) = self.protected_roots.iter().find(|r| !r.is_absolute()) {
            return Err(ConfigError::RelativeProtectedRoot(root.clone()));
        }
        validate_folder_name(&self.quarantine_dir)?;
        if self.io_threads == 0 {
            return Err(ConfigError::ZeroIoThreads);
        }
        if self.chunk_size < MIN_CHUNK_SIZE {
            log::warn!(
                "chunk_size {} is below the minimum, using {}",
                self.chunk_size,
                MIN_CHUNK_SIZE
            );
            self.chunk_size = MIN_CHUNK_SIZE;
        }
        Ok(())
    }

    /// Apply global command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(ref audit_log) = cli.audit_log {
            self.audit_log = Some(audit_log.clone());
        }
    }

    /// Apply `dedupe` command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the overrides fail validation.
    pub fn merge_dedupe_args(&mut self, args: &DedupeArgs) -> Result<(), ConfigError> {
        if let Some(threads) = args.io_threads {
            self.io_threads = threads;
        }
        if let Some(ref name) = args.quarantine_dir {
            self.quarantine_dir = name.clone();
        }
        // Flags may be relative to the working directory; file entries may not.
        self.protected_roots.extend(
            args.protect
                .iter()
                .map(|p| std::path::absolute(p).unwrap_or_else(|_| p.clone())),
        );
        self.validate()
    }

    /// Build the path guard over the protected roots.
    #[must_use]
    pub fn path_guard(&self) -> PathGuard {
        PathGuard::new(ProtectedRootSet::new(self.protected_roots.iter().cloned()))
    }

    /// Build the duplicate finder configuration.
    #[must_use]
    pub fn finder_config(&self, walker_config: WalkerConfig, audit: Arc<AuditLog>) -> FinderConfig {
        FinderConfig::default()
            .with_io_threads(self.io_threads)
            .with_chunk_size(self.chunk_size)
            .with_walker_config(walker_config)
            .with_quarantine_dir(Some(self.quarantine_dir.clone()))
            .with_audit_log(audit)
    }

    /// Build the categorizer configuration.
    #[must_use]
    pub fn organize_config(&self) -> OrganizeConfig {
        OrganizeConfig {
            categories: self.categories.clone(),
            archive_folder: self.archive_folder.clone(),
            archive_extensions: self.archive_extensions.clone(),
        }
    }

    /// Open the configured audit log, or a disabled one.
    ///
    /// A log that cannot be opened is reported and replaced by a disabled
    /// sink; events still reach the console logger.
    #[must_use]
    pub fn open_audit_log(&self) -> AuditLog {
        let Some(ref path) = self.audit_log else {
            return AuditLog::disabled();
        };
        match AuditLog::open(path) {
            Ok(log) => log,
            Err(e) => {
                log::warn!("{e}; audit events go to the console only");
                AuditLog::disabled()
            }
        }
    }
}

fn validate_folder_name(name: &str) -> Result<(), ConfigError> {
    let nested = name.chars().any(std::path::is_separator);
    if name.trim().is_empty() || nested || name == "." || name == ".." {
        return Err(ConfigError::InvalidQuarantineDir(name.to_string()));
    }
    Ok(())
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "tidyfs", "tidyfs")
}

/// Get the default platform-specific configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Get the default platform-specific audit log path.
#[must_use]
pub fn default_audit_log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join("tidyfs.log"))
}
