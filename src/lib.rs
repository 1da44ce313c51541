//! Sitecrawl: a bounded same-host site crawler
//!
//! This crate walks a website from a seed URL, following links that stay on the
//! seed's host, and extracts the main heading, first paragraph, links and images
//! of every page it fetches. Work is bounded by a page budget and by a fixed
//! number of simultaneous outbound requests.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
///
/// None of these errors abort a running crawl: every fetch or URL failure is
/// scoped to the branch that hit it. They surface from construction, report
/// writing, and from the fetcher to the coordinator.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Fetch cancelled for {url}")]
    Cancelled { url: String },

    #[error("Unsupported response from {url}: HTTP {status}")]
    UnsupportedStatus { url: String, status: u16 },

    #[error("Unsupported content type from {url}: {content_type:?}")]
    UnsupportedContentType { url: String, content_type: String },

    #[error("Fetch gate closed")]
    GateClosed,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CrawlError {
    /// Returns true for network failures and cancelled fetches
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Cancelled { .. })
    }

    /// Returns true when the server answered but the response is unusable
    pub fn is_unsupported_response(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedStatus { .. } | Self::UnsupportedContentType { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::config::{Config, LinkBase};
pub use crate::crawler::{CrawlReport, Crawler, ExtractedPage, Extraction};
pub use crate::state::BranchOutcome;
pub use crate::url::{normalize_url, resolve_reference};
