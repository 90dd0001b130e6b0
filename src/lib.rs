//! UX Audit - Heuristic UX checks for a single web page
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Pure rule logic separated from HTTP and terminal concerns
//! - The Fetcher trait is the seam between the evaluator and the network
//! - Reports are ordered (rule, pass/fail) pairs consumable by any renderer

pub mod analyzer;
pub mod chart;
pub mod config;
pub mod document;
pub mod domain;
pub mod fetch;
pub mod report;
pub mod rules;

// Re-export main types for convenient access
pub use domain::outcomes::{AuditError, AuditResult, AuditSummary, CheckOutcome, UxReport};

pub use config::{AuditConfig, HttpConfig, OutputConfig, Thresholds, Vocabulary};

pub use analyzer::Evaluator;

pub use chart::{write_chart, ChartRenderer, SvgBarChart};

pub use document::PageDocument;

pub use fetch::{parse_target, FetchResponse, Fetcher, HttpFetcher};

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use rules::{Check, CheckContext, Rule, RuleInput, RuleRegistry};

use std::path::{Path, PathBuf};

/// Main auditor providing high-level analysis operations
pub struct UxAuditor {
    evaluator: Evaluator,
    report_formatter: ReportFormatter,
    chart_renderer: SvgBarChart,
}

impl UxAuditor {
    /// Create an auditor with the given configuration and the HTTP fetcher
    pub fn new_with_config(config: AuditConfig) -> AuditResult<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Self::with_fetcher(config, Box::new(fetcher))
    }

    /// Create an auditor with default configuration
    pub fn new() -> AuditResult<Self> {
        Self::new_with_config(AuditConfig::default())
    }

    /// Create an auditor loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let config = AuditConfig::load_from_file(path)?;
        Self::new_with_config(config)
    }

    /// Create an auditor that issues all requests through `fetcher`
    pub fn with_fetcher(config: AuditConfig, fetcher: Box<dyn Fetcher>) -> AuditResult<Self> {
        let evaluator = Evaluator::new(config, RuleRegistry::standard(), fetcher)?;
        Ok(Self {
            evaluator,
            report_formatter: ReportFormatter::default(),
            chart_renderer: SvgBarChart::default(),
        })
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    /// Set custom chart layout
    pub fn with_chart_renderer(mut self, renderer: SvgBarChart) -> Self {
        self.chart_renderer = renderer;
        self
    }

    /// Analyze the page at `url`
    pub fn analyze(&self, url: &str) -> AuditResult<UxReport> {
        let target = parse_target(url)?;
        self.evaluator.evaluate(&target)
    }

    /// Format a report for output
    pub fn format_report(&self, report: &UxReport, format: OutputFormat) -> AuditResult<String> {
        self.report_formatter.format_report(report, format)
    }

    /// Write the bar chart to the configured chart directory
    pub fn render_chart(&self, report: &UxReport) -> AuditResult<PathBuf> {
        self.render_chart_to(report, &self.evaluator.config().output.chart_dir)
    }

    /// Write the bar chart into `dir`
    pub fn render_chart_to<P: AsRef<Path>>(&self, report: &UxReport, dir: P) -> AuditResult<PathBuf> {
        write_chart(&self.chart_renderer, report, dir)
    }

    /// Rules in report order
    pub fn rules(&self) -> &[Rule] {
        self.evaluator.registry().rules()
    }

    pub fn config(&self) -> &AuditConfig {
        self.evaluator.config()
    }
}

/// Convenience function to analyze a page with default settings
pub fn analyze_url(url: &str) -> AuditResult<UxReport> {
    UxAuditor::new()?.analyze(url)
}

/// Analyze a page and return the plain pass/fail listing
pub fn generate_report(url: &str) -> AuditResult<String> {
    let auditor = UxAuditor::new()?.with_report_formatter(ReportFormatter::plain());
    let report = auditor.analyze(url)?;
    auditor.format_report(&report, OutputFormat::Human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use tempfile::TempDir;

    const PAGE: &str = r#"<html><head><title>Shop</title></head>
        <body><h1>Shop</h1><img src="/a.png"><a href="/buy">Buy now</a></body></html>"#;

    fn auditor() -> UxAuditor {
        let fetcher = StubFetcher::new()
            .html("http://shop.example.com/", PAGE)
            .status("http://shop.example.com/buy", 200);
        UxAuditor::with_fetcher(AuditConfig::default(), Box::new(fetcher))
            .unwrap()
            .with_report_formatter(ReportFormatter::plain())
    }

    #[test]
    fn test_auditor_creation() {
        let auditor = UxAuditor::new().unwrap();
        assert_eq!(auditor.rules().len(), 14);
        assert_eq!(auditor.config().output.chart_dir, "ux_reports");
    }

    #[test]
    fn test_analyze_and_format() {
        let auditor = auditor();
        let report = auditor.analyze("http://shop.example.com/").unwrap();

        assert_eq!(report.get("1. Proper Heading Structure"), Some(true));
        assert_eq!(report.get("4. Alt Text for Images"), Some(false));
        assert_eq!(report.get("5. Presence of Call to Action (CTA)"), Some(true));
        assert_eq!(report.get("9. HTTPS Enabled"), Some(false));

        let text = auditor.format_report(&report, OutputFormat::Human).unwrap();
        assert!(text.starts_with("UX Analysis Report for http://shop.example.com/:\n\n"));
        assert!(text.contains("✘ 9. HTTPS Enabled (Needs improvement)"));
        assert!(text.contains("✔ 1. Proper Heading Structure"));
    }

    #[test]
    fn test_invalid_url_is_fatal() {
        let result = auditor().analyze("shop.example.com");
        assert!(matches!(result, Err(AuditError::InvalidUrl { .. })));
    }

    #[test]
    fn test_unreachable_host_yields_error_not_report() {
        let config = AuditConfig {
            http: HttpConfig { timeout_secs: 2, ..Default::default() },
            ..Default::default()
        };
        let auditor = UxAuditor::new_with_config(config).unwrap();
        assert!(matches!(auditor.analyze("http://127.0.0.1:1/"), Err(AuditError::Fetch { .. })));
    }

    #[test]
    fn test_render_chart_to_directory() {
        let temp_dir = TempDir::new().unwrap();
        let auditor = auditor();
        let report = auditor.analyze("http://shop.example.com/").unwrap();

        let path = auditor.render_chart_to(&report, temp_dir.path().join("charts")).unwrap();
        assert!(path.ends_with("shop.example.com_ux_report.svg"));
        assert!(path.exists());
    }
}
