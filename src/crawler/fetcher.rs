//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawler's fixed user agent
//! - GET requests that can be aborted by the crawl's cancellation token
//! - Classifying responses into usable HTML bodies and branch-scoped errors

use crate::CrawlError;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, Response};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Content types accepted as HTML
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// A fetched HTML page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: String,
    /// Page body
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The identifying user agent sent with every request
/// * `timeout` - Total per-request timeout
///
/// # Example
///
/// ```no_run
/// use sitecrawl::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("sitecrawl/0.1", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Returns true when a Content-Type header value names an HTML type
///
/// Parameters such as `charset` are ignored and the comparison is case-insensitive.
/// An empty value is not HTML.
pub fn is_html_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    HTML_CONTENT_TYPES.contains(&essence.as_str())
}

/// HTTP collaborator used by the crawler
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and returns its body if it is a successful HTML response
    ///
    /// # Outcomes
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Token cancelled before or during the request | `CrawlError::Cancelled` |
    /// | Connection, timeout, or body read failure | `CrawlError::Transport` |
    /// | Status code >= 400 | `CrawlError::UnsupportedStatus` |
    /// | Content-Type is not HTML | `CrawlError::UnsupportedContentType` |
    /// | Otherwise | `Ok(FetchedPage)` |
    pub async fn fetch(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchedPage, CrawlError> {
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(url)),
            result = self.client.get(url).send() => result.map_err(|e| transport(url, &e))?,
        };

        let (status_code, content_type) = check_response(url, &response)?;
        let final_url = response.url().to_string();

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled(url)),
            result = response.text() => result.map_err(|e| transport(url, &e))?,
        };

        Ok(FetchedPage {
            final_url,
            status_code,
            content_type,
            body,
        })
    }
}

/// Rejects error statuses and non-HTML content before the body is read
fn check_response(url: &str, response: &Response) -> Result<(u16, String), CrawlError> {
    let status = response.status().as_u16();
    if status >= 400 {
        return Err(CrawlError::UnsupportedStatus {
            url: url.to_string(),
            status,
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !is_html_content_type(&content_type) {
        return Err(CrawlError::UnsupportedContentType {
            url: url.to_string(),
            content_type,
        });
    }

    Ok((status, content_type))
}

fn cancelled(url: &str) -> CrawlError {
    CrawlError::Cancelled {
        url: url.to_string(),
    }
}

fn transport(url: &str, error: &reqwest::Error) -> CrawlError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    };
    CrawlError::Transport {
        url: url.to_string(),
        message,
    }
}
