//! Check functions for the built-in rules
//!
//! Each returns `Ok(true)` on pass and `Ok(false)` when the page needs improvement.
//! Missing markup is a fail, never an error. Errors are reserved for failed
//! requests and are turned into a fail by the evaluator.

use super::CheckContext;
use crate::document::PageDocument;
use crate::domain::outcomes::{AuditError, AuditResult};
use std::collections::HashSet;
use url::Url;

const HEADINGS: &str = "h1, h2, h3, h4, h5, h6";
const LANDMARKS: &str = "[aria-label], nav, header, footer, main, aside";

pub fn heading_structure(document: &PageDocument, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    document.has(HEADINGS)
}

/// Re-fetches the URL and looks for a viewport meta tag
pub fn mobile_responsiveness(url: &Url, ctx: &CheckContext<'_>) -> AuditResult<bool> {
    let response = ctx.fetcher.get(url)?;
    let page = PageDocument::parse(&response.body, response.final_url);
    page.has("meta[name=viewport]")
}

/// Crude proxy: any paragraph at all
pub fn text_readability(document: &PageDocument, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    document.has("p")
}

pub fn image_alt_text(document: &PageDocument, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    let alts = document.attribute_values("img", "alt")?;
    Ok(alts.iter().all(|alt| alt.as_deref().is_some_and(|a| !a.is_empty())))
}

pub fn call_to_action(document: &PageDocument, ctx: &CheckContext<'_>) -> AuditResult<bool> {
    Ok(document
        .select("button, a[href]")?
        .iter()
        .any(|element| ctx.matchers.cta.is_match(&element.as_node().text_contents())))
}

/// Probes every link with HEAD; hrefs resolve against the site root
pub fn broken_links(document: &PageDocument, url: &Url, ctx: &CheckContext<'_>) -> AuditResult<bool> {
    let root = site_root(url);
    let mut seen = HashSet::new();

    for href in document.attribute_values("a[href]", "href")?.into_iter().flatten() {
        let mut target = root
            .join(href.trim())
            .map_err(|e| AuditError::invalid_url(href.as_str(), e.to_string()))?;

        if !is_http(&target) {
            tracing::debug!("Skipping non-HTTP link {}", target);
            continue;
        }

        target.set_fragment(None);
        if !seen.insert(target.to_string()) {
            continue;
        }

        let response = ctx.fetcher.head(&target)?;
        if !response.is_success() {
            tracing::debug!("Broken link {} ({})", target, response.status);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Time to first byte of a fresh GET must stay under the threshold
pub fn page_load_speed(url: &Url, ctx: &CheckContext<'_>) -> AuditResult<bool> {
    let response = ctx.fetcher.get(url)?;
    tracing::debug!("Time to first byte for {}: {}ms", url, response.elapsed.as_millis());
    Ok(response.elapsed < ctx.config.thresholds.max_load_time())
}

pub fn accessibility(document: &PageDocument, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    document.has(LANDMARKS)
}

pub fn https_enabled(url: &Url, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    Ok(url.scheme() == "https")
}

pub fn seo_meta_tags(document: &PageDocument, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    Ok(document.has("meta[name=description]")? && document.has("meta[name=keywords]")?)
}

/// Fails only on an image whose reported size exceeds the limit.
///
/// Images without a usable Content-Length, or whose probe fails, pass.
pub fn image_optimization(document: &PageDocument, ctx: &CheckContext<'_>) -> AuditResult<bool> {
    let limit = ctx.config.thresholds.max_image_bytes;

    for src in document.attribute_values("img[src]", "src")?.into_iter().flatten() {
        let target = match document.base_url().join(src.trim()) {
            Ok(target) if is_http(&target) => target,
            _ => continue,
        };

        match ctx.fetcher.head(&target) {
            Ok(response) if response.is_success() => {
                if let Some(size) = response.content_length() {
                    if size > limit {
                        tracing::debug!("Image {} is {} bytes (limit {})", target, size, limit);
                        return Ok(false);
                    }
                }
            }
            Ok(response) => {
                tracing::debug!("Image {} size unknown: status {}", target, response.status);
            }
            Err(e) => {
                tracing::debug!("Image {} size unknown: {}", target, e);
            }
        }
    }

    Ok(true)
}

/// `rel` is a token list, so "shortcut icon" counts
pub fn favicon(document: &PageDocument, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    let rels = document.attribute_values("link[rel]", "rel")?;
    Ok(rels
        .iter()
        .flatten()
        .any(|rel| rel.split_ascii_whitespace().any(|token| token.eq_ignore_ascii_case("icon"))))
}

/// Only the path is inspected; query and fragment are ignored
pub fn url_structure(url: &Url, _ctx: &CheckContext<'_>) -> AuditResult<bool> {
    Ok(url.path().chars().all(|c| c.is_alphanumeric() || c == '/'))
}

pub fn cookie_consent(document: &PageDocument, ctx: &CheckContext<'_>) -> AuditResult<bool> {
    Ok(ctx.matchers.cookie_consent.is_match(&document.text()))
}

/// Scheme, host and port of `url` with an empty path
fn site_root(url: &Url) -> Url {
    let mut root = url.clone();
    root.set_path("/");
    root.set_query(None);
    root.set_fragment(None);
    root
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
