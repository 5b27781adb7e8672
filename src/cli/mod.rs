//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

use crate::config::RunSettings;

/// Parallel BDD feature runner
#[derive(Parser, Debug)]
#[command(name = "feature-dispatch")]
#[command(version)]
#[command(about = "Run BDD feature files in parallel with an external runner")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error) or filter directives
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run feature files in parallel
    Run(RunArgs),

    /// Show the command line each feature file would be run with
    List(ListArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Show a saved run report
    Report(ReportArgs),
}

/// Options that decide which files run and how the runner is invoked
#[derive(Parser, Debug, Default)]
pub struct SelectionArgs {
    /// Feature files or directories (searched recursively for *.feature)
    pub files: Vec<String>,

    /// Runner command [default: behave]
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    /// Tag filter expression passed to the runner
    #[arg(short, long)]
    pub tags: Option<String>,

    /// Runner output format [default: pretty]
    #[arg(short, long)]
    pub format: Option<String>,

    /// Ask the runner to skip step execution
    #[arg(long)]
    pub dry_run: bool,

    /// Named run profile (smoke, all, dry-run, ci, or one from the config file)
    #[arg(long)]
    pub profile: Option<String>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<String>,
}

impl SelectionArgs {
    /// Apply flags given on the command line on top of `settings`
    pub fn apply_to(&self, settings: &mut RunSettings) {
        if !self.files.is_empty() {
            settings.feature_files = self.files.clone();
        }
        if let Some(command) = &self.command {
            settings.runner_command = command.clone();
        }
        if let Some(tags) = &self.tags {
            settings.options.tags = Some(tags.clone());
        }
        if let Some(format) = &self.format {
            settings.options.format = format.clone();
        }
        if self.dry_run {
            settings.options.dry_run = true;
        }
    }
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Maximum concurrent runner processes [default: 4]
    #[arg(short = 'j', long)]
    pub max_workers: Option<usize>,

    /// Per-feature timeout in seconds [default: 300]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Summary output format (text, json, json-pretty)
    #[arg(long, default_value = "text")]
    pub summary_format: String,

    /// Save the run report to a file (YAML for .yaml/.yml, JSON otherwise)
    #[arg(long)]
    pub report: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl RunArgs {
    pub fn apply_to(&self, settings: &mut RunSettings) {
        self.selection.apply_to(settings);
        if let Some(workers) = self.max_workers {
            settings.max_workers = workers;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
    }
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./feature-dispatch.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the current configuration
    Show {
        /// Show environment variable overrides instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (defaults to the first one found)
        #[arg(short, long)]
        file: Option<String>,
    },

    /// List available run profiles
    Profiles {
        /// Show profile details
        #[arg(short, long)]
        detailed: bool,
    },

    /// Describe supported environment variables
    Env,
}

/// Arguments for report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Report file written by `run --report`
    pub path: String,

    /// Output format (text, json, json-pretty)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}
