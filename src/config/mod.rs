//! Configuration module
//!
//! Handles loading configuration and resolving the effective run settings.
//! Precedence, lowest first: defaults, config file, profile, environment,
//! command-line flags.

pub mod env;
mod file;
mod profile;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::discovery;
use crate::executor::{FeatureRunner, DEFAULT_TIMEOUT_SECS};
use crate::models::{InvocationOptions, WorkItem, DEFAULT_FORMAT};

pub use env::EnvConfig;
pub(crate) use file::is_yaml_file;
pub use file::ConfigFile;
pub use profile::RunProfile;

/// Invalid configuration values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_workers must be at least 1")]
    InvalidWorkerCount,

    #[error("timeout must be at least 1 second")]
    InvalidTimeout,

    #[error("runner command must not be empty")]
    EmptyRunnerCommand,

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// External runner binary
    pub runner_command: String,

    /// Maximum concurrent runner processes
    pub max_workers: usize,

    /// Per-feature timeout in seconds
    pub timeout_secs: u64,

    /// Runner output format
    pub format: String,

    /// Tag filter expression
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,

    /// Dry-run mode
    pub dry_run: bool,

    /// Feature files used when none are given on the command line
    pub feature_files: Vec<String>,

    /// Working directory for runner processes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            runner_command: "behave".to_string(),
            max_workers: 4,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            format: DEFAULT_FORMAT.to_string(),
            tags: None,
            dry_run: false,
            feature_files: vec![
                "features/test.feature".to_string(),
                "features/advanced-example.feature".to_string(),
            ],
            working_dir: None,
        }
    }
}

impl AppConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runner_command.trim().is_empty() {
            return Err(ConfigError::EmptyRunnerCommand);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Effective settings for one run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSettings {
    pub runner_command: String,
    pub max_workers: usize,
    pub timeout_secs: u64,
    pub options: InvocationOptions,
    pub feature_files: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub profile: Option<String>,
}

impl RunSettings {
    /// Start from a configuration file's `app` section
    pub fn from_app(app: &AppConfig) -> Self {
        let mut options = InvocationOptions::new()
            .with_format(&app.format)
            .dry_run(app.dry_run);
        if let Some(tags) = &app.tags {
            options = options.with_tags(tags);
        }

        Self {
            runner_command: app.runner_command.clone(),
            max_workers: app.max_workers,
            timeout_secs: app.timeout_secs,
            options,
            feature_files: app.feature_files.clone(),
            working_dir: app.working_dir.as_ref().map(PathBuf::from),
            profile: None,
        }
    }

    pub fn apply_profile(&mut self, profile: &RunProfile) {
        debug!("Applying profile '{}'", profile.name);
        if let Some(tags) = &profile.tags {
            self.options.tags = Some(tags.clone());
        }
        if let Some(format) = &profile.format {
            self.options.format = format.clone();
        }
        if let Some(dry_run) = profile.dry_run {
            self.options.dry_run = dry_run;
        }
        if let Some(workers) = profile.max_workers {
            self.max_workers = workers;
        }
        self.profile = Some(profile.name.clone());
    }

    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(command) = &env.command {
            self.runner_command = command.clone();
        }
        if let Some(workers) = env.max_workers {
            self.max_workers = workers;
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(tags) = &env.tags {
            self.options.tags = Some(tags.clone());
        }
        if let Some(format) = &env.format {
            self.options.format = format.clone();
        }
        if let Some(dry_run) = env.dry_run {
            self.options.dry_run = dry_run;
        }
    }

    /// Drop blank values and check ranges
    pub fn finalize(mut self) -> Result<Self, ConfigError> {
        if self.options.tag_filter().is_none() {
            self.options.tags = None;
        }
        if self.options.format.trim().is_empty() {
            self.options.format = DEFAULT_FORMAT.to_string();
        }
        if self.runner_command.trim().is_empty() {
            return Err(ConfigError::EmptyRunnerCommand);
        }
        if self.max_workers == 0 {
            return Err(ConfigError::InvalidWorkerCount);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Single-item executor for these settings
    pub fn runner(&self) -> FeatureRunner {
        let runner = FeatureRunner::new(&self.runner_command).with_timeout(self.timeout());
        match &self.working_dir {
            Some(dir) => runner.with_working_dir(dir),
            None => runner,
        }
    }

    /// Work items for `paths`, all sharing these options
    pub fn work_items(&self, paths: Vec<PathBuf>) -> Vec<WorkItem> {
        WorkItem::batch(paths, self.options.clone())
    }

    /// Discover the configured feature files and wrap them as work items.
    ///
    /// Relative paths are resolved against `working_dir` when one is set,
    /// matching where the runner process starts.
    pub fn feature_items(&self) -> Result<Vec<WorkItem>> {
        let files =
            discovery::resolve_feature_files(&self.feature_files, self.working_dir.as_deref())?;
        Ok(self.work_items(files))
    }
}

/// Load the configuration file named on the command line, by
/// `FEATURE_DISPATCH_CONFIG`, or found in the standard locations.
pub fn load_config_file(config_path: Option<&str>, env: &EnvConfig) -> Result<ConfigFile> {
    match config_path.or(env.config_file.as_deref()) {
        Some(path) => ConfigFile::load(path),
        None => ConfigFile::load_default(),
    }
}

/// Load the configuration file and resolve settings up to the environment
/// layer. Command-line overrides are applied by the caller.
pub fn load_settings(
    config_path: Option<&str>,
    profile: Option<&str>,
    env: &EnvConfig,
) -> Result<RunSettings> {
    let config = load_config_file(config_path, env)?;
    resolve_settings(&config, profile.or(env.profile.as_deref()), env)
}

/// Resolve settings from an already loaded file
pub fn resolve_settings(
    config: &ConfigFile,
    profile: Option<&str>,
    env: &EnvConfig,
) -> Result<RunSettings> {
    let mut settings = RunSettings::from_app(&config.app);

    if let Some(name) = profile {
        let manager = config.profile_manager();
        let profile = manager
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
        settings.apply_profile(profile);
    }

    settings.apply_env(env);
    Ok(settings)
}
