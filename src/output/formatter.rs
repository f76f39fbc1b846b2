//! Output formatters for probe results
//!
//! Provides table, JSON, CSV and one-line summary output.

use anyhow::{Context, Result};
use std::path::Path;

use crate::models::{RunSummary, Suite, TestResult, TestStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
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

    /// Format a run summary
    pub fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_table(summary)),
            OutputFormat::Json => {
                serde_json::to_string(summary).context("Failed to serialize summary")
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(summary).context("Failed to serialize summary")
            }
            OutputFormat::Csv => format_csv(summary),
            OutputFormat::Summary => Ok(format_brief(summary)),
        }
    }

    fn status_label(&self, status: TestStatus) -> String {
        if !self.colorize {
            return format!("{status:5}");
        }
        let color = match status {
            TestStatus::Pass => "32",
            TestStatus::Fail | TestStatus::Error => "31",
            TestStatus::Skip => "33",
        };
        format!("\x1b[{color}m{status:5}\x1b[0m")
    }

    fn format_result(&self, result: &TestResult) -> String {
        format!(
            "  {} {} {:45} [{:>6}ms] {}",
            result.status.symbol(),
            self.status_label(result.status),
            result.name,
            result.duration_ms,
            result.message
        )
    }

    fn format_table(&self, summary: &RunSummary) -> String {
        let mut output = String::new();

        output.push_str("\n══════════════════════════════════════════════════════════════════════\n");
        output.push_str(&format!(" AlterEgo API probes - {}\n", summary.target));
        output.push_str(&format!(
            " Started {}\n",
            summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output.push_str("══════════════════════════════════════════════════════════════════════\n");

        for suite in Suite::all() {
            let results: Vec<_> = summary.for_suite(suite).collect();
            if results.is_empty() {
                continue;
            }
            output.push_str(&format!("\n {suite}\n"));
            for result in results {
                output.push_str(&self.format_result(result));
                output.push('\n');
            }
        }

        output.push_str("\n──────────────────────────────────────────────────────────────────────\n");

        let rate = format!("{:.1}%", summary.pass_rate());
        let rate = if self.colorize {
            let color = if summary.is_all_passed() {
                "32"
            } else if summary.pass_rate() >= 50.0 {
                "33"
            } else {
                "31"
            };
            format!("\x1b[{color}m{rate}\x1b[0m")
        } else {
            rate
        };

        output.push_str(&format!(
            " Total: {} | Pass: {} | Fail: {} | Skip: {} | Error: {}\n",
            summary.total, summary.passed, summary.failed, summary.skipped, summary.errors
        ));
        output.push_str(&format!(
            " Success Rate: {} | Duration: {}ms\n",
            rate, summary.total_duration_ms
        ));

        let unsuccessful: Vec<_> = summary.unsuccessful().collect();
        if !unsuccessful.is_empty() {
            output.push_str("\n FAILED TESTS:\n");
            for result in unsuccessful {
                output.push_str(&format!(
                    "   - [{}] {}: {}\n",
                    result.status, result.name, result.message
                ));
            }
        }

        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}

fn format_csv(summary: &RunSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "suite",
        "name",
        "status",
        "duration_ms",
        "message",
        "timestamp",
    ])?;

    for result in &summary.results {
        writer.write_record([
            result.suite.slug().to_string(),
            result.name.clone(),
            result.status.to_string(),
            result.duration_ms.to_string(),
            result.message.clone(),
            result.timestamp.to_rfc3339(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

fn format_brief(summary: &RunSummary) -> String {
    format!(
        "{}: {}/{} passed ({:.1}%), {} failed, {} skipped, {} errors in {}ms",
        summary.target,
        summary.passed,
        summary.total,
        summary.pass_rate(),
        summary.failed,
        summary.skipped,
        summary.errors,
        summary.total_duration_ms
    )
}

/// Write results to a file
pub fn write_results_to_file(
    path: impl AsRef<Path>,
    summary: &RunSummary,
    format: OutputFormat,
) -> Result<()> {
    let path = path.as_ref();
    let formatter = ResultFormatter::new(format).no_color();
    let content = formatter.format_summary(summary)?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;

    Ok(())
}
