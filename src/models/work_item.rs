//! Work item models
//!
//! A work item is one feature file plus the runner options applied to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Output format the external runner uses when none is requested
pub const DEFAULT_FORMAT: &str = "pretty";

/// Options shared by every item of a batch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationOptions {
    /// Tag filter expression passed as `--tags`
    pub tags: Option<String>,
    /// Runner output format passed as `--format`
    pub format: String,
    /// Ask the runner to skip step execution
    pub dry_run: bool,
}

impl Default for InvocationOptions {
    fn default() -> Self {
        Self {
            tags: None,
            format: DEFAULT_FORMAT.to_string(),
            dry_run: false,
        }
    }
}

impl InvocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Tag filter, if one was actually supplied
    pub fn tag_filter(&self) -> Option<&str> {
        self.tags.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Whether the format differs from the runner's default
    pub fn has_custom_format(&self) -> bool {
        !self.format.is_empty() && self.format != DEFAULT_FORMAT
    }

    /// Flags appended after the feature file.
    ///
    /// Each flag is emitted only when its option is set, so an unset option
    /// never produces a dangling `--tags` or `--format`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(tags) = self.tag_filter() {
            args.push("--tags".to_string());
            args.push(tags.to_string());
        }

        if self.has_custom_format() {
            args.push("--format".to_string());
            args.push(self.format.clone());
        }

        if self.dry_run {
            args.push("--dry-run".to_string());
        }

        args
    }
}

/// One schedulable unit of work
#[derive(Clone, Debug)]
pub struct WorkItem {
    path: PathBuf,
    options: Arc<InvocationOptions>,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>, options: Arc<InvocationOptions>) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Build a batch of items sharing one set of options
    pub fn batch<I, P>(paths: I, options: InvocationOptions) -> Vec<WorkItem>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let options = Arc::new(options);
        paths
            .into_iter()
            .map(|p| WorkItem::new(p, options.clone()))
            .collect()
    }

    /// Identifier used in results and reports
    pub fn id(&self) -> String {
        self.path.display().to_string()
    }

    /// Arguments passed to the runner: the file, then the option flags
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![self.id()];
        args.extend(self.options.to_args());
        args
    }

    /// Full command line for display
    pub fn command_line(&self, runner_command: &str) -> String {
        let mut parts = vec![runner_command.to_string()];
        parts.extend(self.command_args());
        parts.join(" ")
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
