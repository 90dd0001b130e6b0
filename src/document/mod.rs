//! Parsed HTML document queried by the rules
//!
//! Wraps a kuchiki tree together with the URL it was fetched from.

use crate::domain::outcomes::{AuditError, AuditResult};
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef};
use url::Url;

/// Immutable parsed page
pub struct PageDocument {
    root: NodeRef,
    base_url: Url,
}

impl PageDocument {
    /// Parse an HTML body. The parser is lenient and never fails.
    pub fn parse(html: &str, base_url: Url) -> Self {
        Self { root: kuchiki::parse_html().one(html), base_url }
    }

    /// URL the page was served from
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// All elements matching a CSS selector, in document order
    pub fn select(&self, selector: &str) -> AuditResult<Vec<NodeDataRef<ElementData>>> {
        self.root
            .select(selector)
            .map(|matches| matches.collect())
            .map_err(|()| AuditError::selector(selector))
    }

    /// Whether any element matches
    pub fn has(&self, selector: &str) -> AuditResult<bool> {
        Ok(self.count(selector)? > 0)
    }

    /// Number of matching elements
    pub fn count(&self, selector: &str) -> AuditResult<usize> {
        self.root
            .select(selector)
            .map(|matches| matches.count())
            .map_err(|()| AuditError::selector(selector))
    }

    /// Value of `attr` on every element matching `selector`; `None` where absent
    pub fn attribute_values(&self, selector: &str, attr: &str) -> AuditResult<Vec<Option<String>>> {
        Ok(self
            .select(selector)?
            .iter()
            .map(|element| element.attributes.borrow().get(attr).map(str::to_string))
            .collect())
    }

    /// Concatenated text of the whole document
    pub fn text(&self) -> String {
        self.root.text_contents()
    }
}

impl std::fmt::Debug for PageDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDocument").field("base_url", &self.base_url.as_str()).finish()
    }
}
