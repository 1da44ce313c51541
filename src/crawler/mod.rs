//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with cancellation support
//! - HTML extraction of heading, paragraph, links and images
//! - The bounded gate limiting simultaneous fetches
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod gate;
mod parser;

pub use coordinator::{CrawlReport, Crawler};
pub use fetcher::{build_http_client, is_html_content_type, FetchedPage, Fetcher};
pub use gate::FetchGate;
pub use parser::{extract_page, ExtractedPage, Extraction};

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and build the HTTP client
/// 2. Walk the seed's host, fetching each distinct page at most once
/// 3. Stop when the frontier is exhausted or the page budget is reached
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::Config;
/// use sitecrawl::crawler::crawl;
///
/// # async fn example() -> Result<(), sitecrawl::CrawlError> {
/// let report = crawl(&Config::for_seed("https://example.com/")).await?;
/// println!("visited {} pages", report.visited.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlError> {
    Ok(Crawler::new(config)?.crawl().await)
}
