//! HTTP retrieval for the primary page and secondary probes
//!
//! Architecture: Infrastructure Layer - Fetchers isolate network access behind a trait
//! - The evaluator and checks only see `FetchResponse` values
//! - `HttpFetcher` is the blocking reqwest implementation used by the CLI
//! - Tests substitute canned responses without touching the network

use crate::config::HttpConfig;
use crate::domain::outcomes::{AuditError, AuditResult};
use reqwest::blocking::Client;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use url::Url;

/// Status, headers and body of one HTTP exchange
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code of the final response
    pub status: u16,
    /// Response headers, names lower-cased
    pub headers: BTreeMap<String, String>,
    /// Decoded body (empty for HEAD requests)
    pub body: String,
    /// Time from sending the request until the response headers arrived
    pub elapsed: Duration,
    /// URL of the final response after redirects
    pub final_url: Url,
}

impl FetchResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Declared body size, if the server sent a parseable Content-Length
    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.trim().parse().ok())
    }

    /// Whether the response can be treated as an HTML page.
    ///
    /// A missing Content-Type is given the benefit of the doubt.
    pub fn is_html(&self) -> bool {
        match self.header("content-type") {
            Some(content_type) => content_type.to_ascii_lowercase().contains("html"),
            None => true,
        }
    }
}

/// Source of HTTP responses
pub trait Fetcher {
    /// Issue a GET request and read the full body
    fn get(&self, url: &Url) -> AuditResult<FetchResponse>;

    /// Issue a HEAD request; the returned body is empty
    fn head(&self, url: &Url) -> AuditResult<FetchResponse>;
}

/// Blocking reqwest client following redirects
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher from HTTP settings
    pub fn new(config: &HttpConfig) -> AuditResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AuditError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    fn send(
        &self,
        url: &Url,
        request: reqwest::blocking::RequestBuilder,
        read_body: bool,
    ) -> AuditResult<FetchResponse> {
        let start = Instant::now();
        let response = request.send().map_err(|e| AuditError::fetch(url.as_str(), e.to_string()))?;
        let elapsed = start.elapsed();

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value.to_str().ok().map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let body = if read_body {
            response.text().map_err(|e| AuditError::fetch(url.as_str(), e.to_string()))?
        } else {
            String::new()
        };

        tracing::debug!("{} -> {} in {}ms", url, status, elapsed.as_millis());

        Ok(FetchResponse { status, headers, body, elapsed, final_url })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &Url) -> AuditResult<FetchResponse> {
        self.send(url, self.client.get(url.as_str()), true)
    }

    fn head(&self, url: &Url) -> AuditResult<FetchResponse> {
        self.send(url, self.client.head(url.as_str()), false)
    }
}

/// Parse user input into an absolute URL
pub fn parse_target(input: &str) -> AuditResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AuditError::invalid_url(input, "empty input"));
    }

    let url = Url::parse(trimmed).map_err(|e| AuditError::invalid_url(trimmed, e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(AuditError::invalid_url(trimmed, "expected an absolute URL such as https://example.com"));
    }

    Ok(url)
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Canned reply for one URL
    #[derive(Debug, Clone)]
    pub(crate) enum StubReply {
        Page { status: u16, headers: Vec<(String, String)>, body: String, elapsed: Duration },
        Error(String),
    }

    /// Fetcher serving canned responses keyed by URL
    #[derive(Debug, Default)]
    pub(crate) struct StubFetcher {
        replies: HashMap<String, StubReply>,
        requests: RefCell<Vec<(String, String)>>,
    }

    impl StubFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Serve an HTML page with status 200
        pub(crate) fn html(self, url: &str, body: &str) -> Self {
            self.reply(
                url,
                StubReply::Page {
                    status: 200,
                    headers: vec![("content-type".into(), "text/html; charset=utf-8".into())],
                    body: body.to_string(),
                    elapsed: Duration::from_millis(50),
                },
            )
        }

        pub(crate) fn status(self, url: &str, status: u16) -> Self {
            self.reply(
                url,
                StubReply::Page {
                    status,
                    headers: Vec::new(),
                    body: String::new(),
                    elapsed: Duration::from_millis(5),
                },
            )
        }

        pub(crate) fn content_length(self, url: &str, bytes: u64) -> Self {
            self.reply(
                url,
                StubReply::Page {
                    status: 200,
                    headers: vec![("Content-Length".into(), bytes.to_string())],
                    body: String::new(),
                    elapsed: Duration::from_millis(5),
                },
            )
        }

        pub(crate) fn error(self, url: &str, message: &str) -> Self {
            self.reply(url, StubReply::Error(message.to_string()))
        }

        pub(crate) fn reply(mut self, url: &str, reply: StubReply) -> Self {
            self.replies.insert(url.to_string(), reply);
            self
        }

        /// (method, url) pairs in request order
        pub(crate) fn requests(&self) -> Vec<(String, String)> {
            self.requests.borrow().clone()
        }

        fn answer(&self, method: &str, url: &Url, keep_body: bool) -> AuditResult<FetchResponse> {
            self.requests.borrow_mut().push((method.to_string(), url.to_string()));
            match self.replies.get(url.as_str()) {
                Some(StubReply::Page { status, headers, body, elapsed }) => Ok(FetchResponse {
                    status: *status,
                    headers: headers
                        .iter()
                        .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
                        .collect(),
                    body: if keep_body { body.clone() } else { String::new() },
                    elapsed: *elapsed,
                    final_url: url.clone(),
                }),
                Some(StubReply::Error(message)) => Err(AuditError::fetch(url.as_str(), message.clone())),
                None => Err(AuditError::fetch(url.as_str(), "no stubbed response")),
            }
        }
    }

    impl Fetcher for StubFetcher {
        fn get(&self, url: &Url) -> AuditResult<FetchResponse> {
            self.answer("GET", url, true)
        }

        fn head(&self, url: &Url) -> AuditResult<FetchResponse> {
            self.answer("HEAD", url, false)
        }
    }
}
