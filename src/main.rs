//! feature-dispatch - Parallel BDD Feature Runner
//!
//! Runs an external BDD runner (`behave` by default) against many feature
//! files at once, with a bounded number of concurrent processes, and reports
//! an aggregate result.
//!
//! ## Features
//!
//! - Bounded parallel execution with per-file timeouts
//! - Tag filters, output format and dry-run passed through to the runner
//! - Layered configuration: file, profiles, environment, flags
//! - Text or JSON summaries and saved run reports
//!
//! ## Usage
//!
//! ```bash
//! # Run the configured feature files
//! feature-dispatch run
//!
//! # Run every feature under a directory, 8 at a time, smoke scenarios only
//! feature-dispatch run features/ -j 8 --tags @smoke
//!
//! # Show what would be executed
//! feature-dispatch list features/ --profile ci
//!
//! # Save and later inspect a report
//! feature-dispatch run --report reports/run.json
//! feature-dispatch report reports/run.json
//! ```
//!
//! The exit status is the number of failed feature files (at most 254), or
//! 255 when no feature file was found.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::io::IsTerminal;
use tracing::{debug, error, info, warn};

mod cli;
mod config;
mod discovery;
mod executor;
mod models;
mod output;
mod report;
mod utils;

use cli::{Args, SelectionArgs};
use config::{EnvConfig, RunSettings};
use executor::{DispatchError, ParallelDispatcher};
use models::Outcome;
use output::{OutputFormat, ResultFormatter};
use report::RunReport;
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    // --log-level beats --verbose, which beats FEATURE_DISPATCH_LOG
    let level = LogLevel::resolve(args.log_level.as_deref(), args.verbose);
    let directives = match (&args.log_level, args.verbose) {
        (Some(level), _) => Some(level.as_str()),
        (None, true) => None,
        (None, false) => env.log.as_deref(),
    };
    init_logger(level, directives);

    let code = match args.command {
        cli::Command::Run(run_args) => run_features(run_args, &env).await?,
        cli::Command::List(list_args) => list_features(list_args, &env)?,
        cli::Command::Config(config_args) => {
            manage_config(config_args, &env)?;
            0
        }
        cli::Command::Report(report_args) => {
            show_report(report_args)?;
            0
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Settings from file, profile and environment, before command-line flags
fn base_settings(selection: &SelectionArgs, env: &EnvConfig) -> Result<RunSettings> {
    config::load_settings(
        selection.config.as_deref(),
        selection.profile.as_deref(),
        env,
    )
}

async fn run_features(args: cli::RunArgs, env: &EnvConfig) -> Result<i32> {
    let format = OutputFormat::from_str(&args.summary_format)
        .ok_or_else(|| anyhow!("Unknown summary format: {}", args.summary_format))?;

    let mut settings = base_settings(&args.selection, env)?;
    args.apply_to(&mut settings);
    let settings = settings.finalize()?;
    debug!("Effective settings: {:?}", settings);

    let items = settings.feature_items()?;

    let mut formatter = ResultFormatter::new(format);
    if args.no_color || !std::io::stdout().is_terminal() {
        formatter = formatter.no_color();
    }

    let runner = settings.runner();
    debug!("Runner: {} (timeout {:?})", runner.command(), runner.timeout());
    let dispatcher = ParallelDispatcher::new(runner, settings.max_workers);

    if !items.is_empty() {
        let header = formatter.format_header(items.len(), dispatcher.max_workers(), &settings);
        if let Some(header) = header {
            println!("{header}");
        }
    }

    let outcome = dispatcher
        .dispatch(items, |result| {
            if let Some(line) = formatter.format_result(result) {
                println!("{line}");
            }
        })
        .await;

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e @ DispatchError::NoWorkItems) => {
            println!("{}", formatter.format_error(&e));
            return Ok(e.exit_code());
        }
    };

    println!("{}", formatter.format_summary(&summary));
    if summary.is_all_passed() {
        info!("All {} feature files passed", summary.total);
    }

    let timed_out = summary
        .results
        .iter()
        .filter(|r| r.outcome == Outcome::TimedOut)
        .count();
    if timed_out > 0 {
        warn!("{} feature files hit the {}s timeout", timed_out, settings.timeout_secs);
    }

    if let Some(path) = &args.report {
        let report = RunReport::new(&settings, summary.clone());
        match report.save(path) {
            Ok(()) => info!("Report {} written", report.id),
            Err(e) => error!("Failed to save run report: {:#}", e),
        }
    }

    Ok(summary.exit_code())
}

fn list_features(args: cli::ListArgs, env: &EnvConfig) -> Result<i32> {
    let mut settings = base_settings(&args.selection, env)?;
    args.selection.apply_to(&mut settings);
    let settings = settings.finalize()?;

    let items = settings.feature_items()?;
    if items.is_empty() {
        let e = DispatchError::NoWorkItems;
        println!("{e}");
        return Ok(e.exit_code());
    }

    println!(
        "{} feature files (max {} processes, timeout {}s):",
        items.len(),
        settings.max_workers,
        settings.timeout_secs
    );
    for item in &items {
        println!("  {}", item.command_line(&settings.runner_command));
    }

    Ok(0)
}

fn manage_config(args: cli::ConfigArgs, env_config: &EnvConfig) -> Result<()> {
    use config::ConfigFile;
    use std::path::Path;

    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            let config = ConfigFile::example();
            config.save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { env, format } => {
            if env {
                env_config.print_summary();
                if !env_config.has_any() {
                    println!("\nNo overrides set.");
                }
            } else {
                let config = config::load_config_file(None, env_config)?;
                let output = if format == "json" {
                    serde_json::to_string_pretty(&config)?
                } else {
                    serde_yaml::to_string(&config)?
                };
                println!("{output}");
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file.or_else(|| env_config.config_file.clone()).unwrap_or_else(|| {
                ConfigFile::find()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "./feature-dispatch.yaml".to_string())
            });

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Profiles { detailed } => {
            let config = config::load_config_file(None, env_config)?;
            let manager = config.profile_manager();

            println!("Run Profiles:");
            println!("{:-<60}", "");
            for profile in manager.list() {
                if detailed {
                    println!("  {}", profile.name);
                    println!("    Description: {}", profile.description);
                    println!("    Overrides: {}", profile.overrides());
                    println!();
                } else {
                    println!("  {:12} - {}", profile.name, profile.description);
                }
            }
        }

        cli::ConfigAction::Env => {
            config::env::print_env_help();
        }
    }

    Ok(())
}

fn show_report(args: cli::ReportArgs) -> Result<()> {
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", args.format))?;

    let report = RunReport::load(&args.path)?;

    if format.is_json() {
        let output = if format == OutputFormat::JsonPretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        println!("{output}");
        return Ok(());
    }

    println!("Run {} ({})", report.id, report.summary.started_at.to_rfc3339());
    println!("  {}", report.describe());

    let formatter = ResultFormatter::new(format).no_color();
    for result in &report.summary.results {
        if let Some(line) = formatter.format_result(result) {
            println!("{line}");
        }
    }
    println!("{}", formatter.format_summary(&report.summary));

    Ok(())
}
