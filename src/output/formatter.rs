//! Output formatters for run results
//!
//! Provides the human-readable console layout and JSON output.

use serde_json::json;

use crate::config::RunSettings;
use crate::executor::DispatchError;
use crate::models::{ExecutionResult, RunSummary};

/// Width of the separator lines around the live results
const SEPARATOR_WIDTH: usize = 60;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    JsonPretty,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            _ => None,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::JsonPretty)
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Banner printed before dispatch. JSON output has none.
    pub fn format_header(
        &self,
        count: usize,
        max_workers: usize,
        settings: &RunSettings,
    ) -> Option<String> {
        if self.format.is_json() {
            return None;
        }

        let mut lines = vec![
            format!(
                "Running {} feature files in parallel (max {} processes)",
                count, max_workers
            ),
            format!("Command: {}", settings.runner_command),
        ];
        if let Some(tags) = settings.options.tag_filter() {
            lines.push(format!("Tags: {tags}"));
        }
        if settings.options.has_custom_format() {
            lines.push(format!("Output format: {}", settings.options.format));
        }
        if settings.options.dry_run {
            lines.push("DRY RUN MODE - No actual tests will be executed".to_string());
        }
        lines.push(separator());

        Some(lines.join("\n"))
    }

    /// Live line for one completed item. JSON output has none.
    pub fn format_result(&self, result: &ExecutionResult) -> Option<String> {
        if self.format.is_json() {
            return None;
        }

        let status = match (result.succeeded, self.colorize) {
            (true, true) => "\x1b[32m✓ PASS\x1b[0m",
            (true, false) => "✓ PASS",
            (false, true) => "\x1b[31m✗ FAIL\x1b[0m",
            (false, false) => "✗ FAIL",
        };

        let mut output = format!("{} {}", status, result.item);
        if !result.succeeded {
            if let Some(error) = result.error_text() {
                output.push_str(&format!("\n  Error: {error}"));
            }
        }
        Some(output)
    }

    /// Closing block after every item finished
    pub fn format_summary(&self, summary: &RunSummary) -> String {
        match self.format {
            OutputFormat::Text => self.format_summary_text(summary),
            OutputFormat::Json => serde_json::to_string(summary).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(summary).unwrap_or_default(),
        }
    }

    /// Message for a batch that could not run, in the summary format
    pub fn format_error(&self, error: &DispatchError) -> String {
        let value = json!({
            "error": error.to_string(),
            "exit_code": error.exit_code(),
        });
        match self.format {
            OutputFormat::Text => error.to_string(),
            OutputFormat::Json => value.to_string(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(&value).unwrap_or_default(),
        }
    }

    fn format_summary_text(&self, summary: &RunSummary) -> String {
        let mut output = String::new();
        output.push_str(&separator());
        output.push('\n');

        let failed = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };
        output.push_str(&format!(
            "Summary: {} passed, {} failed\n",
            summary.passed, failed
        ));
        output.push_str(&format!(
            "Total execution time: {:.2} seconds",
            summary.duration_secs()
        ));

        if summary.failed > 0 {
            output.push_str("\n\nFailed tests:");
            for result in summary.failures() {
                output.push_str(&format!(
                    "\n  - {}: {}",
                    result.item,
                    result.error_text().unwrap_or("")
                ));
            }
        }

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use chrono::Utc;
    use std::time::Duration;

    fn settings() -> RunSettings {
        RunSettings::from_app(&AppConfig::default())
    }

    fn mixed_summary() -> RunSummary {
        RunSummary::new(
            vec![
                ExecutionResult::completed("a.feature", 0, "ok", "", Duration::ZERO),
                ExecutionResult::completed("b.feature", 1, "", "boom\n", Duration::ZERO),
            ],
            Utc::now(),
            Duration::from_millis(2340),
        )
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TEXT"), Some(OutputFormat::Text));
        assert_eq!(
            OutputFormat::from_str("json-pretty"),
            Some(OutputFormat::JsonPretty)
        );
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_header_lists_only_set_options() {
        let formatter = ResultFormatter::default().no_color();
        let header = formatter.format_header(2, 4, &settings()).unwrap();
        assert!(header.starts_with("Running 2 feature files in parallel (max 4 processes)"));
        assert!(header.contains("Command: behave"));
        assert!(!header.contains("Tags:"));
        assert!(!header.contains("Output format:"));
        assert!(!header.contains("DRY RUN"));

        let mut custom = settings();
        custom.options = custom.options.with_tags("@smoke").with_format("progress").dry_run(true);
        let header = formatter.format_header(1, 4, &custom).unwrap();
        assert!(header.contains("Tags: @smoke"));
        assert!(header.contains("Output format: progress"));
        assert!(header.contains("DRY RUN MODE - No actual tests will be executed"));
        assert!(header.ends_with(&"-".repeat(60)));
    }

    #[test]
    fn test_result_lines() {
        let formatter = ResultFormatter::default().no_color();

        let pass = ExecutionResult::completed("a.feature", 0, "", "", Duration::ZERO);
        assert_eq!(formatter.format_result(&pass).unwrap(), "✓ PASS a.feature");

        let fail = ExecutionResult::completed("b.feature", 1, "", "boom\n", Duration::ZERO);
        assert_eq!(
            formatter.format_result(&fail).unwrap(),
            "✗ FAIL b.feature\n  Error: boom"
        );

        let silent = ExecutionResult::completed("c.feature", 2, "", "", Duration::ZERO);
        assert_eq!(formatter.format_result(&silent).unwrap(), "✗ FAIL c.feature");
    }

    #[test]
    fn test_colorized_result_line() {
        let pass = ExecutionResult::completed("a.feature", 0, "", "", Duration::ZERO);
        let line = ResultFormatter::default().format_result(&pass).unwrap();
        assert!(line.contains("\x1b[32m"));
    }

    #[test]
    fn test_text_summary() {
        let text = ResultFormatter::default()
            .no_color()
            .format_summary(&mixed_summary());

        assert!(text.contains("Summary: 1 passed, 1 failed"));
        assert!(text.contains("Total execution time: 2.34 seconds"));
        assert!(text.contains("Failed tests:\n  - b.feature: boom"));
        assert!(!text.contains("a.feature"));
    }

    #[test]
    fn test_json_output() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        assert!(formatter.format_header(1, 4, &settings()).is_none());

        let json = formatter.format_summary(&mixed_summary());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["passed"], 1);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["results"][1]["outcome"], "failed");
    }

    #[test]
    fn test_header_uses_effective_worker_count() {
        let header = ResultFormatter::default()
            .no_color()
            .format_header(3, 1, &settings())
            .unwrap();
        assert!(header.starts_with("Running 3 feature files in parallel (max 1 processes)"));
    }

    #[test]
    fn test_empty_input_message_follows_format() {
        let error = DispatchError::NoWorkItems;

        let text = ResultFormatter::default().format_error(&error);
        assert_eq!(text, "No feature files found!");

        for format in [OutputFormat::Json, OutputFormat::JsonPretty] {
            let output = ResultFormatter::new(format).format_error(&error);
            let value: serde_json::Value = serde_json::from_str(&output).unwrap();
            assert_eq!(value["error"], "No feature files found!");
            assert_eq!(value["exit_code"], 255);
        }
    }
}
