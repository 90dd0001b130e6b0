//! Configuration loading and management for UX Audit
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML formats
//! - Raw YAML structures are converted to clean domain objects
//! - Every section defaults to the built-in heuristics, so an empty file is valid
//! - Vocabularies are compiled once into case-insensitive matchers

use crate::domain::outcomes::{AuditError, AuditResult};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// File names probed in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["ux_audit.yaml", "ux_audit.yml", ".ux_audit.yaml"];

/// Main configuration structure for UX Audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,
    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
    /// Numeric pass thresholds
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Phrase lists used by text-matching rules
    #[serde(default)]
    pub vocabulary: Vocabulary,
    /// Artifact output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Numeric pass thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thresholds {
    /// Time-to-first-byte must be strictly below this
    #[serde(default = "default_max_load_time_ms")]
    pub max_load_time_ms: u64,
    /// Images reporting a larger Content-Length fail the optimization rule
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

/// Phrase lists used by text-matching rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Call-to-action phrases searched in buttons and links
    #[serde(default = "default_cta_phrases")]
    pub cta_phrases: Vec<String>,
    /// Phrases that indicate a cookie consent notice
    #[serde(default = "default_cookie_phrases")]
    pub cookie_phrases: Vec<String>,
}

/// Artifact output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory charts are written to, created on demand
    #[serde(default = "default_chart_dir")]
    pub chart_dir: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: default_timeout_secs(), user_agent: default_user_agent() }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_load_time_ms: default_max_load_time_ms(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self { cta_phrases: default_cta_phrases(), cookie_phrases: default_cookie_phrases() }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { chart_dir: default_chart_dir() }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Thresholds {
    pub fn max_load_time(&self) -> Duration {
        Duration::from_millis(self.max_load_time_ms)
    }
}

impl AuditConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            AuditError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            AuditError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> AuditResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| AuditError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the first default file that exists, else built-in defaults
    pub fn discover(path: Option<&Path>) -> AuditResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        for name in DEFAULT_CONFIG_FILES {
            if Path::new(name).exists() {
                tracing::debug!("Using configuration file {}", name);
                return Self::load_from_file(name);
            }
        }

        Ok(Self::default())
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> AuditResult<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            return Err(AuditError::config(format!(
                "Unsupported configuration version: {}. Supported versions: 1.0",
                self.version
            )));
        }

        if self.http.timeout_secs == 0 {
            return Err(AuditError::config("http.timeout_secs must be greater than zero"));
        }

        if self.thresholds.max_load_time_ms == 0 {
            return Err(AuditError::config("thresholds.max_load_time_ms must be greater than zero"));
        }

        if self.thresholds.max_image_bytes == 0 {
            return Err(AuditError::config("thresholds.max_image_bytes must be greater than zero"));
        }

        if self.output.chart_dir.trim().is_empty() {
            return Err(AuditError::config("output.chart_dir must not be empty"));
        }

        // Matchers must compile for both vocabularies
        self.vocabulary.compile()?;

        Ok(())
    }

    /// Convert to YAML for display or saving
    pub fn to_yaml(&self) -> AuditResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AuditError::config(format!("Failed to serialize config: {e}")))
    }

    /// Create a fingerprint of the configuration for report provenance
    pub fn fingerprint(&self) -> String {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        self.version.hash(&mut hasher);
        self.http.timeout_secs.hash(&mut hasher);
        self.http.user_agent.hash(&mut hasher);
        self.thresholds.max_load_time_ms.hash(&mut hasher);
        self.thresholds.max_image_bytes.hash(&mut hasher);

        // Phrase order has no effect on matching
        let mut cta = self.vocabulary.cta_phrases.clone();
        cta.sort();
        cta.hash(&mut hasher);
        let mut cookie = self.vocabulary.cookie_phrases.clone();
        cookie.sort();
        cookie.hash(&mut hasher);

        self.output.chart_dir.hash(&mut hasher);

        format!("{:x}", hasher.finish())
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            http: HttpConfig::default(),
            thresholds: Thresholds::default(),
            vocabulary: Vocabulary::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Compiled phrase matchers
#[derive(Debug, Clone)]
pub struct PhraseMatchers {
    pub cta: Regex,
    pub cookie_consent: Regex,
}

impl Vocabulary {
    /// Compile both phrase lists into case-insensitive substring matchers
    pub fn compile(&self) -> AuditResult<PhraseMatchers> {
        Ok(PhraseMatchers {
            cta: build_phrase_matcher("vocabulary.cta_phrases", &self.cta_phrases)?,
            cookie_consent: build_phrase_matcher(
                "vocabulary.cookie_phrases",
                &self.cookie_phrases,
            )?,
        })
    }
}

/// Build an alternation of literal phrases, matched anywhere and ignoring case
fn build_phrase_matcher(field: &str, phrases: &[String]) -> AuditResult<Regex> {
    let escaped: Vec<String> = phrases
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();

    if escaped.is_empty() {
        return Err(AuditError::config(format!("{field} must contain at least one phrase")));
    }

    RegexBuilder::new(&escaped.join("|"))
        .case_insensitive(true)
        .build()
        .map_err(|e| AuditError::config(format!("Invalid phrase list in {field}: {e}")))
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("ux-audit/{}", env!("CARGO_PKG_VERSION"))
}

fn default_max_load_time_ms() -> u64 {
    2_000
}

fn default_max_image_bytes() -> u64 {
    500_000
}

fn default_cta_phrases() -> Vec<String> {
    ["buy", "subscribe", "learn more", "contact", "sign up"].iter().map(|s| s.to_string()).collect()
}

fn default_cookie_phrases() -> Vec<String> {
    ["cookie consent", "accept cookies", "privacy policy"].iter().map(|s| s.to_string()).collect()
}

fn default_chart_dir() -> String {
    "ux_reports".to_string()
}
