//! Run reports
//!
//! Persists the outcome of a run together with the settings that produced
//! it. Reports are YAML for `.yaml`/`.yml` paths and pretty JSON otherwise.

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{is_yaml_file, RunSettings};
use crate::models::RunSummary;

/// Saved record of one dispatched batch
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub id: String,

    pub runner_command: String,
    pub max_workers: usize,
    pub timeout_secs: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    pub format: String,
    pub dry_run: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Tool version that wrote the report
    pub tool_version: String,

    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(settings: &RunSettings, summary: RunSummary) -> Self {
        Self {
            id: generate_run_id(),
            runner_command: settings.runner_command.clone(),
            max_workers: settings.max_workers,
            timeout_secs: settings.timeout_secs,
            tags: settings.options.tag_filter().map(str::to_string),
            format: settings.options.format.clone(),
            dry_run: settings.options.dry_run,
            profile: settings.profile.clone(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            summary,
        }
    }

    /// Write the report, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create report file: {}", path.display()))?;
        let writer = BufWriter::new(file);

        if is_yaml_file(path) {
            serde_yaml::to_writer(writer, self).context("Failed to write report")?;
        } else {
            serde_json::to_writer_pretty(writer, self).context("Failed to write report")?;
        }

        info!("Saved run report to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open report file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let report: Self = if is_yaml_file(path) {
            serde_yaml::from_reader(reader)
                .with_context(|| format!("Failed to parse report: {}", path.display()))?
        } else {
            serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse report: {}", path.display()))?
        };

        debug!("Loaded run report {} from {}", report.id, path.display());
        Ok(report)
    }

    /// One-line description of the settings the run used
    pub fn describe(&self) -> String {
        let mut parts = vec![
            format!("command={}", self.runner_command),
            format!("max_workers={}", self.max_workers),
            format!("timeout={}s", self.timeout_secs),
        ];
        if let Some(tags) = &self.tags {
            parts.push(format!("tags={tags}"));
        }
        parts.push(format!("format={}", self.format));
        if self.dry_run {
            parts.push("dry_run".to_string());
        }
        if let Some(profile) = &self.profile {
            parts.push(format!("profile={profile}"));
        }
        parts.join(", ")
    }
}

/// Generate a unique run ID
fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::ExecutionResult;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_report() -> RunReport {
        let mut settings = RunSettings::from_app(&AppConfig::default());
        settings.options.tags = Some("@smoke".to_string());
        settings.profile = Some("smoke".to_string());

        let summary = RunSummary::new(
            vec![
                ExecutionResult::completed("a.feature", 0, "", "", Duration::from_millis(5)),
                ExecutionResult::timed_out("b.feature", Duration::from_secs(300)),
            ],
            Utc::now(),
            Duration::from_millis(300_010),
        );
        RunReport::new(&settings, summary)
    }

    #[test]
    fn test_run_id_format() {
        let id = generate_run_id();
        assert_eq!(id.len(), "20240101_120000_0000".len());
        assert_eq!(&id[8..9], "_");
    }

    #[test]
    fn test_report_captures_settings() {
        let report = sample_report();
        assert_eq!(report.runner_command, "behave");
        assert_eq!(report.tags.as_deref(), Some("@smoke"));
        assert_eq!(report.summary.failed, 1);
        assert_eq!(
            report.describe(),
            "command=behave, max_workers=4, timeout=300s, tags=@smoke, format=pretty, profile=smoke"
        );
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("run.json");

        let report = sample_report();
        report.save(&path).unwrap();

        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.summary.results, report.summary.results);
    }

    #[test]
    fn test_save_yaml_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.yaml");

        sample_report().save(&path).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("runner_command: behave"));
        assert!(content.contains("outcome: timed_out"));

        let loaded = RunReport::load(&path).unwrap();
        assert_eq!(loaded.summary.total, 2);
    }

    #[test]
    fn test_load_missing_report_fails() {
        let err = RunReport::load("/no/such/report.json").unwrap_err();
        assert!(err.to_string().contains("Failed to open report file"));
    }
}
