//! Core domain models for audit outcomes and reports
//!
//! Architecture: Rich Domain Models - the report is an aggregate root over ordered outcomes
//! - Each outcome binds exactly one rule identifier to a pass/fail result
//! - UxReport preserves registration order and keeps its summary in step with its outcomes
//! - Renderers consume the report through ordered (identifier, bool) pairs only

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pass/fail result of a single rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Display identifier of the rule, e.g. "6. No Broken Links"
    pub rule_id: String,
    /// Whether the page satisfied the rule
    pub passed: bool,
}

impl CheckOutcome {
    pub fn new(rule_id: impl Into<String>, passed: bool) -> Self {
        Self { rule_id: rule_id.into(), passed }
    }

    /// Format outcome for display
    pub fn format_display(&self) -> String {
        if self.passed {
            format!("✔ {}", self.rule_id)
        } else {
            format!("✘ {} (Needs improvement)", self.rule_id)
        }
    }
}

/// Summary statistics for an audit report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditSummary {
    /// Number of rules that passed
    pub passed: usize,
    /// Number of rules that need improvement
    pub failed: usize,
    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
    /// Timestamp when the page was analyzed
    pub analyzed_at: DateTime<Utc>,
}

impl AuditSummary {
    /// Total number of rules evaluated
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Complete report for one analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UxReport {
    /// URL that was analyzed, as supplied by the caller
    pub url: String,
    /// Outcomes in rule registration order
    pub outcomes: Vec<CheckOutcome>,
    /// Summary statistics
    pub summary: AuditSummary,
    /// Configuration used for this run
    pub config_fingerprint: Option<String>,
}

impl UxReport {
    /// Create a new empty report for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            outcomes: Vec::new(),
            summary: AuditSummary { analyzed_at: Utc::now(), ..Default::default() },
            config_fingerprint: None,
        }
    }

    /// Record the outcome of a rule.
    ///
    /// Identifiers are unique within a report; recording the same rule twice
    /// replaces the earlier outcome in place so the original position is kept.
    pub fn record(&mut self, rule_id: impl Into<String>, passed: bool) {
        let rule_id = rule_id.into();
        if let Some(existing) = self.outcomes.iter_mut().find(|o| o.rule_id == rule_id) {
            existing.passed = passed;
        } else {
            self.outcomes.push(CheckOutcome::new(rule_id, passed));
        }
        self.recount();
    }

    fn recount(&mut self) {
        self.summary.passed = self.outcomes.iter().filter(|o| o.passed).count();
        self.summary.failed = self.outcomes.len() - self.summary.passed;
    }

    /// Outcome of a rule by identifier
    pub fn get(&self, rule_id: &str) -> Option<bool> {
        self.outcomes.iter().find(|o| o.rule_id == rule_id).map(|o| o.passed)
    }

    /// Ordered (identifier, passed) pairs, the shape every renderer consumes
    pub fn entries(&self) -> impl Iterator<Item = (&str, bool)> {
        self.outcomes.iter().map(|o| (o.rule_id.as_str(), o.passed))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether every rule passed
    pub fn all_passed(&self) -> bool {
        self.summary.failed == 0
    }

    /// Outcomes that need improvement
    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed)
    }

    /// Set the execution time
    pub fn set_execution_time(&mut self, duration_ms: u64) {
        self.summary.execution_time_ms = duration_ms;
    }

    /// Set the configuration fingerprint
    pub fn set_config_fingerprint(&mut self, fingerprint: impl Into<String>) {
        self.config_fingerprint = Some(fingerprint.into());
    }
}

/// Error types that can occur during an audit
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or written
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Input could not be turned into an absolute URL
    #[error("Invalid URL '{input}': {message}")]
    InvalidUrl { input: String, message: String },

    /// Request failed before a response arrived
    #[error("Request to {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// Server answered with a non-success status
    #[error("{url} answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Response was not an HTML page
    #[error("{url} is not an HTML page (content type '{content_type}')")]
    NotHtml { url: String, content_type: String },

    /// A CSS selector could not be compiled
    #[error("Invalid selector: {selector}")]
    Selector { selector: String },

    /// Rule registration violated an invariant
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// Chart rendering failed
    #[error("Render error: {message}")]
    Render { message: String },
}

impl AuditError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an invalid URL error
    pub fn invalid_url(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl { input: input.into(), message: message.into() }
    }

    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch { url: url.into(), message: message.into() }
    }

    /// Create a selector error
    pub fn selector(selector: impl Into<String>) -> Self {
        Self::Selector { selector: selector.into() }
    }

    /// Create a registry error
    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry { message: message.into() }
    }

    /// Create a render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render { message: message.into() }
    }
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
