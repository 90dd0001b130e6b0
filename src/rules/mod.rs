//! Rule registry for UX heuristics
//!
//! Architectural Principle: Service Layer - the registry is the single source of rule order
//! - Each rule carries its input signature as a tagged `Check` variant
//! - Registration enforces unique identifiers and strictly increasing ordinals
//! - Check functions live in `checks` and never see inputs they did not declare

pub mod checks;

use crate::config::{AuditConfig, PhraseMatchers};
use crate::document::PageDocument;
use crate::domain::outcomes::{AuditError, AuditResult};
use crate::fetch::Fetcher;
use url::Url;

/// Collaborators available to every check
pub struct CheckContext<'a> {
    /// Used by rules that issue their own requests
    pub fetcher: &'a dyn Fetcher,
    pub config: &'a AuditConfig,
    pub matchers: &'a PhraseMatchers,
}

/// Check that needs only the parsed page
pub type DocumentCheck = fn(&PageDocument, &CheckContext<'_>) -> AuditResult<bool>;
/// Check that needs only the analyzed URL
pub type UrlCheck = fn(&Url, &CheckContext<'_>) -> AuditResult<bool>;
/// Check that needs the parsed page and the analyzed URL
pub type PageCheck = fn(&PageDocument, &Url, &CheckContext<'_>) -> AuditResult<bool>;

/// Which inputs a rule consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleInput {
    Document,
    Url,
    DocumentAndUrl,
}

impl RuleInput {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Url => "url",
            Self::DocumentAndUrl => "document+url",
        }
    }
}

/// Check procedure tagged with its input signature
#[derive(Clone, Copy)]
pub enum Check {
    Document(DocumentCheck),
    Url(UrlCheck),
    DocumentAndUrl(PageCheck),
}

impl Check {
    pub fn input(&self) -> RuleInput {
        match self {
            Self::Document(_) => RuleInput::Document,
            Self::Url(_) => RuleInput::Url,
            Self::DocumentAndUrl(_) => RuleInput::DocumentAndUrl,
        }
    }

    /// Run the check with exactly the inputs it declares
    pub fn invoke(
        &self,
        document: &PageDocument,
        url: &Url,
        ctx: &CheckContext<'_>,
    ) -> AuditResult<bool> {
        match self {
            Self::Document(check) => check(document, ctx),
            Self::Url(check) => check(url, ctx),
            Self::DocumentAndUrl(check) => check(document, url, ctx),
        }
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Check({})", self.input().as_str())
    }
}

/// Immutable rule descriptor
#[derive(Debug, Clone)]
pub struct Rule {
    id: String,
    description: String,
    check: Check,
}

impl Rule {
    pub fn new(id: impl Into<String>, description: impl Into<String>, check: Check) -> Self {
        Self { id: id.into(), description: description.into(), check }
    }

    /// Display identifier, beginning with its ordinal
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn check(&self) -> Check {
        self.check
    }

    pub fn input(&self) -> RuleInput {
        self.check.input()
    }

    /// Leading number of the identifier, e.g. 6 for "6. No Broken Links"
    pub fn ordinal(&self) -> Option<u32> {
        parse_ordinal(&self.id)
    }
}

fn parse_ordinal(id: &str) -> Option<u32> {
    let (number, rest) = id.split_once('.')?;
    if rest.trim().is_empty() {
        return None;
    }
    number.trim().parse().ok()
}

/// Ordered set of rules; iteration order is report order
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in battery of fourteen UX rules
    pub fn standard() -> Self {
        let rules = vec![
            Rule::new(
                "1. Proper Heading Structure",
                "The page contains at least one heading element (h1-h6).",
                Check::Document(checks::heading_structure),
            ),
            Rule::new(
                "2. Mobile Responsiveness",
                "A fresh fetch of the URL contains a viewport meta tag.",
                Check::Url(checks::mobile_responsiveness),
            ),
            Rule::new(
                "3. Text Readability (Contrast and Font Size)",
                "The page contains at least one paragraph element.",
                Check::Document(checks::text_readability),
            ),
            Rule::new(
                "4. Alt Text for Images",
                "Every image has a non-empty alt attribute.",
                Check::Document(checks::image_alt_text),
            ),
            Rule::new(
                "5. Presence of Call to Action (CTA)",
                "A button or link text contains a call-to-action phrase such as 'sign up' or 'learn more'.",
                Check::Document(checks::call_to_action),
            ),
            Rule::new(
                "6. No Broken Links",
                "Every link, resolved against the site root, answers a HEAD request with a 2xx status.",
                Check::DocumentAndUrl(checks::broken_links),
            ),
            Rule::new(
                "7. Page Load Speed",
                "Time to first byte of a fresh request is below the load time threshold (2s by default).",
                Check::Url(checks::page_load_speed),
            ),
            Rule::new(
                "8. Accessibility (ARIA Labels and Landmarks)",
                "The page uses an aria-label or a landmark element (nav, header, footer, main, aside).",
                Check::Document(checks::accessibility),
            ),
            Rule::new(
                "9. HTTPS Enabled",
                "The URL scheme is https.",
                Check::Url(checks::https_enabled),
            ),
            Rule::new(
                "10. SEO Meta Tags",
                "Both description and keywords meta tags are present.",
                Check::Document(checks::seo_meta_tags),
            ),
            Rule::new(
                "11. Optimized Images",
                "No image reports a Content-Length above the image size threshold (500000 bytes by default).",
                Check::Document(checks::image_optimization),
            ),
            Rule::new(
                "12. Favicon Present",
                "A link element with rel=\"icon\" is present.",
                Check::Document(checks::favicon),
            ),
            Rule::new(
                "13. Clean URL Structure",
                "The URL path contains only alphanumeric characters and '/'.",
                Check::Url(checks::url_structure),
            ),
            Rule::new(
                "14. Cookie Consent Banner",
                "The page text mentions cookie consent, accepting cookies or a privacy policy.",
                Check::Document(checks::cookie_consent),
            ),
        ];

        let mut registry = Self::new();
        for rule in rules {
            // The built-in identifiers are unique and ascending
            if let Err(e) = registry.register(rule) {
                tracing::error!("Built-in rule rejected: {}", e);
            }
        }
        registry
    }

    /// Append a rule, enforcing unique identifiers and ascending ordinals
    pub fn register(&mut self, rule: Rule) -> AuditResult<()> {
        let ordinal = rule.ordinal().ok_or_else(|| {
            AuditError::registry(format!(
                "Rule identifier '{}' must start with an ordinal such as '15. '",
                rule.id
            ))
        })?;

        if self.rules.iter().any(|r| r.id == rule.id) {
            return Err(AuditError::registry(format!("Duplicate rule identifier '{}'", rule.id)));
        }

        if let Some(last) = self.rules.last().and_then(Rule::ordinal) {
            if ordinal <= last {
                return Err(AuditError::registry(format!(
                    "Rule '{}' has ordinal {} but must come after ordinal {}",
                    rule.id, ordinal, last
                )));
            }
        }

        self.rules.push(rule);
        Ok(())
    }

    /// Builder-style variant of `register`
    pub fn with_rule(mut self, rule: Rule) -> AuditResult<Self> {
        self.register(rule)?;
        Ok(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by exact identifier, by ordinal ("6"), or by case-insensitive name
    pub fn find(&self, query: &str) -> Option<&Rule> {
        let query = query.trim();
        if let Ok(ordinal) = query.trim_end_matches('.').parse::<u32>() {
            return self.rules.iter().find(|r| r.ordinal() == Some(ordinal));
        }

        self.rules.iter().find(|r| r.id == query).or_else(|| {
            let needle = query.to_lowercase();
            self.rules.iter().find(|r| {
                r.id.split_once('.').map(|(_, name)| name.trim().to_lowercase() == needle).unwrap_or(false)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_: &PageDocument, _: &CheckContext<'_>) -> AuditResult<bool> {
        Ok(true)
    }

    #[test]
    fn test_standard_registry_order() {
        let registry = RuleRegistry::standard();
        assert_eq!(registry.len(), 14);

        let ordinals: Vec<u32> = registry.rules().iter().filter_map(Rule::ordinal).collect();
        assert_eq!(ordinals, (1..=14).collect::<Vec<_>>());
        assert_eq!(registry.rules()[5].id(), "6. No Broken Links");
    }

    #[test]
    fn test_standard_input_signatures() {
        let registry = RuleRegistry::standard();
        let input = |q: &str| registry.find(q).map(Rule::input);

        assert_eq!(input("1"), Some(RuleInput::Document));
        assert_eq!(input("2"), Some(RuleInput::Url));
        assert_eq!(input("6"), Some(RuleInput::DocumentAndUrl));
        assert_eq!(input("9"), Some(RuleInput::Url));
        assert_eq!(input("11"), Some(RuleInput::Document));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("1. Alpha", "", Check::Document(always))).unwrap();
        let err = registry.register(Rule::new("1. Alpha", "", Check::Document(always))).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_register_rejects_out_of_order_ordinals() {
        let mut registry = RuleRegistry::new();
        registry.register(Rule::new("2. Beta", "", Check::Document(always))).unwrap();
        assert!(registry.register(Rule::new("1. Alpha", "", Check::Document(always))).is_err());
        assert!(registry.register(Rule::new("2. Gamma", "", Check::Document(always))).is_err());
        assert!(registry.register(Rule::new("3. Gamma", "", Check::Document(always))).is_ok());
    }

    #[test]
    fn test_register_requires_ordinal() {
        let mut registry = RuleRegistry::new();
        assert!(registry.register(Rule::new("Alpha", "", Check::Document(always))).is_err());
        assert!(registry.register(Rule::new("7.", "", Check::Document(always))).is_err());
    }

    #[test]
    fn test_appending_to_standard_registry() {
        let registry = RuleRegistry::standard()
            .with_rule(Rule::new("15. Custom", "custom", Check::Document(always)))
            .unwrap();
        assert_eq!(registry.len(), 15);
        assert_eq!(registry.rules().last().map(Rule::id), Some("15. Custom"));
    }

    #[test]
    fn test_find_by_ordinal_name_and_id() {
        let registry = RuleRegistry::standard();
        assert_eq!(registry.find("9").map(Rule::id), Some("9. HTTPS Enabled"));
        assert_eq!(registry.find("9.").map(Rule::id), Some("9. HTTPS Enabled"));
        assert_eq!(registry.find("12. Favicon Present").map(Rule::id), Some("12. Favicon Present"));
        assert_eq!(registry.find("favicon present").map(Rule::id), Some("12. Favicon Present"));
        assert!(registry.find("99").is_none());
        assert!(registry.find("nonexistent").is_none());
    }
}
