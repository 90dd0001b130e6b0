//! Report generation with multiple output formats
//!
//! Anti-Corruption Layer - Formatters translate the report into external formats
//! - UxReport (domain) is converted to text, JSON or JUnit XML
//! - Every format walks outcomes in report order and never reorders rules
//! - Formatting is a pure function of the report and the options

use crate::domain::outcomes::{AuditError, AuditResult, CheckOutcome, UxReport};
use serde_json::Value as JsonValue;
use std::io::Write;

/// Supported output formats for audit reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable pass/fail listing
    Human,
    /// JSON format for programmatic consumption
    Json,
    /// JUnit XML format for CI/CD integration
    Junit,
}

impl OutputFormat {
    /// Parse format from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "junit" => Some(Self::Junit),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["human", "json", "junit"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to append the summary line (for human format)
    pub show_summary: bool,
    /// Only list rules that need improvement
    pub failures_only: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_summary: true, failures_only: false }
    }
}

/// Main report formatter that dispatches to specific formatters
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Plain listing with no colors and no summary
    pub fn plain() -> Self {
        Self::new(ReportOptions { use_colors: false, show_summary: false, failures_only: false })
    }

    /// Format a report in the specified format
    pub fn format_report(&self, report: &UxReport, format: OutputFormat) -> AuditResult<String> {
        let outcomes = self.filter_outcomes(&report.outcomes);

        match format {
            OutputFormat::Human => Ok(self.format_human(report, &outcomes)),
            OutputFormat::Json => self.format_json(report, &outcomes),
            OutputFormat::Junit => Ok(self.format_junit(report, &outcomes)),
        }
    }

    /// Write a formatted report to a writer
    pub fn write_report<W: Write>(
        &self,
        report: &UxReport,
        format: OutputFormat,
        mut writer: W,
    ) -> AuditResult<()> {
        let formatted = self.format_report(report, format)?;
        writer.write_all(formatted.as_bytes()).map_err(|e| AuditError::Io { source: e })?;
        Ok(())
    }

    fn filter_outcomes<'a>(&self, outcomes: &'a [CheckOutcome]) -> Vec<&'a CheckOutcome> {
        outcomes.iter().filter(|o| !self.options.failures_only || !o.passed).collect()
    }

    /// Format report in human-readable format
    fn format_human(&self, report: &UxReport, outcomes: &[&CheckOutcome]) -> String {
        let mut output = format!("UX Analysis Report for {}:\n\n", report.url);

        for outcome in outcomes {
            let line = outcome.format_display();
            if self.options.use_colors {
                output.push_str(&paint(&line, outcome.passed));
            } else {
                output.push_str(&line);
            }
            output.push('\n');
        }

        if self.options.show_summary {
            output.push('\n');
            output.push_str(&self.format_summary(report));
        }

        output
    }

    /// Format report in JSON format
    fn format_json(&self, report: &UxReport, outcomes: &[&CheckOutcome]) -> AuditResult<String> {
        let results: Vec<JsonValue> = outcomes
            .iter()
            .map(|o| {
                serde_json::json!({
                    "rule": o.rule_id,
                    "passed": o.passed,
                })
            })
            .collect();

        let json_report = serde_json::json!({
            "url": report.url,
            "results": results,
            "summary": {
                "passed": report.summary.passed,
                "failed": report.summary.failed,
                "total": report.summary.total(),
                "execution_time_ms": report.summary.execution_time_ms,
                "analyzed_at": report.summary.analyzed_at.to_rfc3339(),
            },
            "config_fingerprint": report.config_fingerprint,
        });

        serde_json::to_string_pretty(&json_report)
            .map_err(|e| AuditError::config(format!("JSON serialization failed: {e}")))
    }

    /// Format report in JUnit XML format
    fn format_junit(&self, report: &UxReport, outcomes: &[&CheckOutcome]) -> String {
        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");

        let failures = outcomes.iter().filter(|o| !o.passed).count();
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;

        xml.push_str(&format!(
            "<testsuite name=\"ux-audit\" hostname=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" time=\"{:.3}\">\n",
            escape_xml(&report.url),
            outcomes.len(),
            failures,
            execution_time
        ));

        for outcome in outcomes {
            xml.push_str(&format!(
                "  <testcase classname=\"ux-audit\" name=\"{}\"",
                escape_xml(&outcome.rule_id)
            ));
            if outcome.passed {
                xml.push_str("/>\n");
            } else {
                xml.push_str(">\n    <failure message=\"Needs improvement\"/>\n  </testcase>\n");
            }
        }

        xml.push_str("</testsuite>\n");
        xml
    }

    /// Format the summary line
    fn format_summary(&self, report: &UxReport) -> String {
        let execution_time = (report.summary.execution_time_ms as f64) / 1000.0;
        format!(
            "Summary: {} of {} checks passed ({:.1}s)\n",
            report.summary.passed,
            report.summary.total(),
            execution_time
        )
    }
}

#[cfg(feature = "colors")]
fn paint(line: &str, passed: bool) -> String {
    use colored::Colorize;

    if passed {
        line.green().to_string()
    } else {
        line.red().to_string()
    }
}

#[cfg(not(feature = "colors"))]
fn paint(line: &str, passed: bool) -> String {
    let color = if passed { "32" } else { "31" };
    format!("\x1b[{color}m{line}\x1b[0m")
}

/// Escape XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
