use serde::Deserialize;

/// Default number of simultaneous outbound fetches
pub const DEFAULT_MAX_CONCURRENCY: u32 = 5;

/// Default number of distinct pages admitted for fetching
pub const DEFAULT_MAX_PAGES: i64 = 100;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Identifying user agent sent with every request unless overridden
pub const DEFAULT_USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (+",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Builds a configuration with default limits for the given seed URL
    pub fn for_seed(seed_url: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                seed_url: seed_url.into(),
                max_concurrency: DEFAULT_MAX_CONCURRENCY,
                max_pages: DEFAULT_MAX_PAGES,
                user_agent: None,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                link_base: LinkBase::default(),
            },
            output: OutputConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Absolute URL the crawl starts from; its hostname bounds the crawl
    pub seed_url: String,

    /// Maximum number of concurrent page fetches
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,

    /// Maximum number of distinct pages to visit (non-positive means 1)
    #[serde(default = "default_max_pages")]
    pub max_pages: i64,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Which URL relative links are resolved against
    #[serde(default)]
    pub link_base: LinkBase,
}

impl CrawlerConfig {
    /// Page budget with non-positive values coerced up to 1
    pub fn page_budget(&self) -> usize {
        usize::try_from(self.max_pages.max(1)).unwrap_or(usize::MAX)
    }

    /// The user agent string sent with every request
    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Base URL used to resolve relative links discovered on a page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkBase {
    /// Resolve against the crawl's seed URL
    #[default]
    Seed,
    /// Resolve against the URL of the page the link was found on
    Page,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path of the CSV page report, if one should be written
    #[serde(default)]
    pub report_path: Option<String>,
}

fn default_max_concurrency() -> u32 {
    DEFAULT_MAX_CONCURRENCY
}

fn default_max_pages() -> i64 {
    DEFAULT_MAX_PAGES
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
