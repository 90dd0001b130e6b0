//! Main evaluation orchestrator for UX Audit
//!
//! Domain Services - the Evaluator runs one analysis from fetch to report
//! - Fetches and parses the page once; a failed fetch aborts the run
//! - Invokes every registered rule in order with the inputs it declares
//! - Isolates rule failures so one flaky probe cannot blank out the report

use crate::config::{AuditConfig, PhraseMatchers};
use crate::document::PageDocument;
use crate::domain::outcomes::{AuditError, AuditResult, UxReport};
use crate::fetch::Fetcher;
use crate::rules::{CheckContext, Rule, RuleRegistry};
use std::time::Instant;
use url::Url;

/// Runs the rule registry against a single page
pub struct Evaluator {
    config: AuditConfig,
    matchers: PhraseMatchers,
    registry: RuleRegistry,
    fetcher: Box<dyn Fetcher>,
}

impl Evaluator {
    /// Create an evaluator; the configuration is validated and its vocabularies compiled
    pub fn new(
        config: AuditConfig,
        registry: RuleRegistry,
        fetcher: Box<dyn Fetcher>,
    ) -> AuditResult<Self> {
        config.validate()?;
        let matchers = config.vocabulary.compile()?;

        Ok(Self { config, matchers, registry, fetcher })
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Analyze `url` and return a report with one outcome per rule.
    ///
    /// Fails without a report when the page cannot be fetched as HTML.
    pub fn evaluate(&self, url: &Url) -> AuditResult<UxReport> {
        let start_time = Instant::now();
        tracing::info!("Analyzing {} with {} rules", url, self.registry.len());

        let document = self.fetch_document(url)?;
        let ctx = CheckContext {
            fetcher: self.fetcher.as_ref(),
            config: &self.config,
            matchers: &self.matchers,
        };

        let mut report = UxReport::new(url.as_str());
        for rule in self.registry.rules() {
            let passed = run_isolated(rule, &document, url, &ctx);
            report.record(rule.id(), passed);
        }

        report.set_execution_time(start_time.elapsed().as_millis() as u64);
        report.set_config_fingerprint(self.config.fingerprint());

        tracing::info!(
            "Finished {}: {} of {} rules passed",
            url,
            report.summary.passed,
            report.summary.total()
        );

        Ok(report)
    }

    /// Primary fetch: must succeed with a 2xx HTML response
    fn fetch_document(&self, url: &Url) -> AuditResult<PageDocument> {
        let response = self.fetcher.get(url)?;

        if !response.is_success() {
            return Err(AuditError::HttpStatus { url: url.to_string(), status: response.status });
        }

        if !response.is_html() {
            return Err(AuditError::NotHtml {
                url: url.to_string(),
                content_type: response.header("content-type").unwrap_or_default().to_string(),
            });
        }

        Ok(PageDocument::parse(&response.body, response.final_url))
    }
}

/// Invoke a rule, converting any error into a fail
fn run_isolated(rule: &Rule, document: &PageDocument, url: &Url, ctx: &CheckContext<'_>) -> bool {
    match rule.check().invoke(document, url, ctx) {
        Ok(passed) => {
            tracing::debug!("{} -> {}", rule.id(), if passed { "pass" } else { "needs improvement" });
            passed
        }
        Err(e) => {
            tracing::warn!("Rule '{}' could not be verified: {}", rule.id(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::stub::StubFetcher;
    use crate::rules::Check;

    const URL: &str = "https://example.com/";

    const GOOD_PAGE: &str = r#"<html><head>
        <meta name="viewport" content="width=device-width">
        <meta name="description" content="d"><meta name="keywords" content="k">
        <link rel="icon" href="/favicon.ico">
        </head><body>
        <header><h1>Welcome</h1></header>
        <p>Some text. Read our privacy policy.</p>
        <img src="/logo.png" alt="Logo">
        <a href="/signup">Sign up</a>
        </body></html>"#;

    fn evaluator(fetcher: StubFetcher) -> Evaluator {
        Evaluator::new(AuditConfig::default(), RuleRegistry::standard(), Box::new(fetcher)).unwrap()
    }

    fn healthy_site() -> StubFetcher {
        StubFetcher::new()
            .html(URL, GOOD_PAGE)
            .status("https://example.com/signup", 200)
            .content_length("https://example.com/logo.png", 12_000)
    }

    #[test]
    fn test_all_rules_pass_on_healthy_page() {
        let report = evaluator(healthy_site()).evaluate(&Url::parse(URL).unwrap()).unwrap();

        assert_eq!(report.len(), 14);
        assert!(report.all_passed(), "failures: {:?}", report.failures().collect::<Vec<_>>());
        assert!(report.config_fingerprint.is_some());
    }

    #[test]
    fn test_report_order_matches_registry_and_is_stable() {
        let evaluator = evaluator(healthy_site());
        let url = Url::parse(URL).unwrap();

        let first = evaluator.evaluate(&url).unwrap();
        let second = evaluator.evaluate(&url).unwrap();

        let registry_ids: Vec<&str> = evaluator.registry().rules().iter().map(Rule::id).collect();
        let first_ids: Vec<&str> = first.entries().map(|(id, _)| id).collect();
        let second_ids: Vec<&str> = second.entries().map(|(id, _)| id).collect();
        assert_eq!(first_ids, registry_ids);
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn test_fetch_failure_yields_no_report() {
        let fetcher = StubFetcher::new().error(URL, "dns error");
        let result = evaluator(fetcher).evaluate(&Url::parse(URL).unwrap());
        assert!(matches!(result, Err(AuditError::Fetch { .. })));
    }

    #[test]
    fn test_error_status_yields_no_report() {
        let fetcher = StubFetcher::new().status(URL, 503);
        let result = evaluator(fetcher).evaluate(&Url::parse(URL).unwrap());
        assert!(matches!(result, Err(AuditError::HttpStatus { status: 503, .. })));
    }

    #[test]
    fn test_non_html_yields_no_report() {
        let fetcher = StubFetcher::new().reply(
            URL,
            crate::fetch::stub::StubReply::Page {
                status: 200,
                headers: vec![("Content-Type".into(), "application/pdf".into())],
                body: String::new(),
                elapsed: std::time::Duration::from_millis(1),
            },
        );
        let result = evaluator(fetcher).evaluate(&Url::parse(URL).unwrap());
        assert!(matches!(result, Err(AuditError::NotHtml { .. })));
    }

    #[test]
    fn test_failing_probe_only_affects_its_rule() {
        let fetcher = StubFetcher::new()
            .html(URL, GOOD_PAGE)
            .error("https://example.com/signup", "timed out")
            .content_length("https://example.com/logo.png", 12_000);
        let report = evaluator(fetcher).evaluate(&Url::parse(URL).unwrap()).unwrap();

        assert_eq!(report.get("6. No Broken Links"), Some(false));
        assert_eq!(report.get("1. Proper Heading Structure"), Some(true));
        assert_eq!(report.get("2. Mobile Responsiveness"), Some(true));
        assert_eq!(report.summary.failed, 1);
    }

    #[test]
    fn test_custom_rule_receives_declared_inputs() {
        fn query_free(url: &Url, _: &CheckContext<'_>) -> AuditResult<bool> {
            Ok(url.query().is_none())
        }
        fn always_errors(_: &PageDocument, _: &CheckContext<'_>) -> AuditResult<bool> {
            Err(AuditError::selector("broken"))
        }

        let registry = RuleRegistry::new()
            .with_rule(Rule::new("1. No Query", "", Check::Url(query_free)))
            .unwrap()
            .with_rule(Rule::new("2. Explodes", "", Check::Document(always_errors)))
            .unwrap();
        let fetcher = StubFetcher::new().html(URL, "<p>x</p>");
        let evaluator = Evaluator::new(AuditConfig::default(), registry, Box::new(fetcher)).unwrap();

        let report = evaluator.evaluate(&Url::parse(URL).unwrap()).unwrap();
        assert_eq!(report.get("1. No Query"), Some(true));
        assert_eq!(report.get("2. Explodes"), Some(false));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = AuditConfig::default();
        config.vocabulary.cookie_phrases.clear();
        let result = Evaluator::new(config, RuleRegistry::standard(), Box::new(StubFetcher::new()));
        assert!(result.is_err());
    }
}
