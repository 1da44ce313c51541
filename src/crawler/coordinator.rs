//! Crawler coordinator - main crawl orchestration logic
//!
//! Every candidate URL becomes one traversal branch:
//! - Host filter against the seed's hostname
//! - Normalization into the dedup key
//! - Atomic admission against the visit ledger and page budget
//! - Fetch through the bounded gate
//! - Extraction, then one spawned child branch per outgoing link
//!
//! A branch finishes only after all of its children have finished, so the
//! root branch completing means the whole crawl is done. Failures end the
//! branch that hit them and nothing else.

use crate::config::{validate, Config, LinkBase};
use crate::crawler::gate::FetchGate;
use crate::crawler::parser::{extract_page, ExtractedPage};
use crate::crawler::{build_http_client, Fetcher};
use crate::state::{Admission, BranchOutcome, CrawlState};
use crate::url::{extract_domain, is_same_host, normalize_parsed};
use crate::{CrawlError, UrlError};
use reqwest::Client;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

type BranchFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Final result of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// The seed URL the crawl started from
    pub seed_url: String,

    /// Encounter count per normalized URL
    pub visits: HashMap<String, u64>,

    /// Normalized URLs admitted for fetching (never more than the page budget)
    pub visited: HashSet<String>,

    /// Extracted record of every page that returned an HTML body
    pub pages: HashMap<String, ExtractedPage>,

    /// Number of branches that ended in each outcome
    pub outcomes: HashMap<BranchOutcome, u64>,

    /// Whether the page budget stopped the crawl
    pub budget_exhausted: bool,

    /// Whether the crawl was cancelled from outside before it finished
    pub interrupted: bool,

    /// Highest number of fetches that were in flight at once
    pub peak_concurrent_fetches: usize,

    /// Total fetches started through the gate
    pub fetches: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of branches that ended in `outcome`
    pub fn outcome_count(&self, outcome: BranchOutcome) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Encounter count for a normalized URL
    pub fn visit_count(&self, key: &str) -> u64 {
        self.visits.get(key).copied().unwrap_or(0)
    }
}

/// State shared by every branch of one crawl
struct CrawlContext {
    seed: Url,
    seed_host: String,
    link_base: LinkBase,
    fetcher: Fetcher,
    gate: FetchGate,
    state: CrawlState,
    pages: Mutex<HashMap<String, ExtractedPage>>,
    cancel: CancellationToken,
}

/// Main crawler structure
///
/// One instance runs one crawl; `crawl` consumes it.
pub struct Crawler {
    ctx: Arc<CrawlContext>,
}

impl Crawler {
    /// Creates a crawler from a configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(CrawlError)` - The configuration is invalid or the HTTP client could not be built
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        let client = build_http_client(
            config.crawler.user_agent(),
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;
        Self::with_client(config, client)
    }

    /// Creates a crawler that sends its requests through `client`
    pub fn with_client(config: &Config, client: Client) -> Result<Self, CrawlError> {
        validate(config)?;

        let seed =
            Url::parse(&config.crawler.seed_url).map_err(|e| UrlError::Parse(e.to_string()))?;
        let seed_host = extract_domain(&seed).ok_or(UrlError::MissingHost)?;

        if config.crawler.max_pages < 1 {
            tracing::warn!(
                "max_pages {} is not positive, using 1",
                config.crawler.max_pages
            );
        }

        let cancel = CancellationToken::new();
        let ctx = CrawlContext {
            seed,
            seed_host,
            link_base: config.crawler.link_base,
            fetcher: Fetcher::new(client),
            gate: FetchGate::new(config.crawler.max_concurrency as usize),
            state: CrawlState::new(config.crawler.page_budget(), cancel.clone()),
            pages: Mutex::new(HashMap::new()),
            cancel,
        };

        Ok(Self { ctx: Arc::new(ctx) })
    }

    /// Token that stops the crawl when cancelled
    ///
    /// The crawl cancels it itself when the page budget runs out. Cancelling
    /// it from outside aborts in-flight fetches and stops further traversal;
    /// `crawl` still returns what was gathered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.ctx.cancel.clone()
    }

    /// The fetch gate, for observing in-flight and peak fetch counts
    pub fn gate(&self) -> &FetchGate {
        &self.ctx.gate
    }

    /// Runs the crawl to completion and returns the report
    ///
    /// Completes when the frontier is exhausted or the page budget stops the
    /// crawl. Individual fetch and URL failures never fail the crawl.
    pub async fn crawl(self) -> CrawlReport {
        let start = Instant::now();
        let seed = self.ctx.seed.to_string();

        tracing::info!(
            "Starting crawl of {} (max {} pages, {} concurrent fetches)",
            seed,
            self.ctx.state.max_pages(),
            self.ctx.gate.capacity()
        );

        crawl_branch(Arc::clone(&self.ctx), seed.clone()).await;

        let snapshot = self.ctx.state.take_snapshot();
        let pages = std::mem::take(
            &mut *self
                .ctx
                .pages
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );

        let report = CrawlReport {
            seed_url: seed,
            visits: snapshot.visits,
            visited: snapshot.visited,
            pages,
            outcomes: snapshot.outcomes,
            budget_exhausted: snapshot.budget_exhausted,
            interrupted: self.ctx.cancel.is_cancelled() && !snapshot.budget_exhausted,
            peak_concurrent_fetches: self.ctx.gate.peak(),
            fetches: self.ctx.gate.admitted(),
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Crawl completed: {} pages visited, {} extracted, {} distinct URLs seen in {:?}",
            report.visited.len(),
            report.pages.len(),
            report.visits.len(),
            report.elapsed
        );

        report
    }
}

/// One traversal branch: process the candidate, then fan out over its links
///
/// Boxed so the branch can spawn copies of itself.
fn crawl_branch(ctx: Arc<CrawlContext>, candidate: String) -> BranchFuture {
    Box::pin(async move {
        let (outcome, links) = ctx.process(&candidate).await;
        ctx.state.record_outcome(outcome);

        if links.is_empty() {
            return;
        }

        let mut children = spawn_children(&ctx, &candidate, links);
        while let Some(result) = children.join_next().await {
            if let Err(e) = result {
                tracing::error!("Crawl branch below {} failed: {}", candidate, e);
            }
        }
    })
}

/// Spawns one child branch per link, in document order
///
/// Spawning stops at the first link seen after the crawl was stopped; the
/// remaining links are dropped without touching the ledger.
fn spawn_children(ctx: &Arc<CrawlContext>, parent: &str, links: Vec<String>) -> JoinSet<()> {
    let mut children = JoinSet::new();
    for link in links {
        if ctx.state.is_stopped() {
            tracing::debug!("Crawl stopped, not following remaining links of {}", parent);
            break;
        }
        children.spawn(crawl_branch(Arc::clone(ctx), link));
    }
    children
}

impl CrawlContext {
    /// Runs a branch up to link discovery
    ///
    /// Returns how the branch ended and the links to follow (empty unless a
    /// page was extracted).
    async fn process(&self, candidate: &str) -> (BranchOutcome, Vec<String>) {
        let url = match Url::parse(candidate) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Skipping invalid URL {}: {}", candidate, e);
                return (BranchOutcome::InvalidUrl, Vec::new());
            }
        };

        if !is_same_host(&url, &self.seed_host) {
            tracing::debug!("Skipping {}: not on host {}", candidate, self.seed_host);
            return (BranchOutcome::ForeignHost, Vec::new());
        }

        let key = match normalize_parsed(&url) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Failed to normalize URL {}: {}", candidate, e);
                return (BranchOutcome::InvalidUrl, Vec::new());
            }
        };

        // No await between here and the admission decision
        match self.state.admit(&key) {
            Admission::Admitted => {}
            Admission::AlreadyVisited => return (BranchOutcome::AlreadyVisited, Vec::new()),
            Admission::BudgetExhausted { .. } => {
                return (BranchOutcome::BudgetExhausted, Vec::new())
            }
        }

        if self.state.is_stopped() {
            tracing::debug!("Crawl stopped before fetching {}", candidate);
            return (BranchOutcome::Stopped, Vec::new());
        }

        tracing::debug!("Fetching {}", candidate);
        let fetched = match self
            .gate
            .admit(self.fetcher.fetch(candidate, &self.cancel))
            .await
        {
            Ok(Ok(page)) => page,
            Ok(Err(e)) | Err(e) => {
                let outcome = fetch_failure_outcome(&e);
                if outcome == BranchOutcome::Cancelled {
                    tracing::debug!("{}", e);
                } else {
                    tracing::warn!("{}", e);
                }
                return (outcome, Vec::new());
            }
        };

        tracing::debug!(
            "Fetched {} (HTTP {}, {}, {} bytes)",
            fetched.final_url,
            fetched.status_code,
            fetched.content_type,
            fetched.body.len()
        );

        let base = match self.link_base {
            LinkBase::Seed => &self.seed,
            LinkBase::Page => &url,
        };
        let extraction = extract_page(&fetched.body, candidate, base);
        let outcome = if extraction.is_degraded() {
            BranchOutcome::Degraded
        } else {
            BranchOutcome::Extracted
        };

        let page = extraction.into_page();
        let links = page.links.clone();
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, page);

        (outcome, links)
    }
}

/// Maps a fetch error to the branch outcome it ends in
fn fetch_failure_outcome(error: &CrawlError) -> BranchOutcome {
    match error {
        CrawlError::Cancelled { .. } => BranchOutcome::Cancelled,
        CrawlError::UnsupportedStatus { .. } => BranchOutcome::UnsupportedStatus,
        CrawlError::UnsupportedContentType { .. } => BranchOutcome::ContentMismatch,
        _ => BranchOutcome::TransportFailed,
    }
}
