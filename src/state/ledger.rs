//! Visit ledger and page budget shared by every traversal branch
//!
//! Admission is a single check-and-update under one lock: a branch counts the
//! encounter, then learns whether its key is new, already fetched elsewhere,
//! or over budget. No other branch can observe the visited set between the
//! membership check and the insert.

use crate::state::BranchOutcome;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Result of asking the ledger to admit a normalized URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Key is new and counts toward the page budget; go ahead and fetch
    Admitted,

    /// Key was admitted earlier by some branch
    AlreadyVisited,

    /// Budget is used up; `first` is true for the branch that tripped it
    BudgetExhausted { first: bool },
}

/// Everything the ledger accumulated over one crawl
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Encounter count per normalized URL
    pub visits: HashMap<String, u64>,

    /// Normalized URLs admitted for fetching
    pub visited: HashSet<String>,

    /// Number of branches that ended in each outcome
    pub outcomes: HashMap<BranchOutcome, u64>,

    /// Whether the page budget stopped the crawl
    pub budget_exhausted: bool,
}

#[derive(Debug, Default)]
struct LedgerInner {
    visits: HashMap<String, u64>,
    visited: HashSet<String>,
    outcomes: HashMap<BranchOutcome, u64>,
    budget_exhausted: bool,
}

/// Shared crawl state: visit ledger, visited set, and stop signal
///
/// The stop flag is the cancellation token itself. It only ever goes from
/// running to cancelled.
#[derive(Debug)]
pub struct CrawlState {
    inner: Mutex<LedgerInner>,
    max_pages: usize,
    cancel: CancellationToken,
}

impl CrawlState {
    /// Creates an empty ledger with the given page budget (minimum 1)
    pub fn new(max_pages: usize, cancel: CancellationToken) -> Self {
        Self {
            inner: Mutex::new(LedgerInner::default()),
            max_pages: max_pages.max(1),
            cancel,
        }
    }

    /// The page budget
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Counts an encounter of `key` and decides whether it may be fetched
    ///
    /// The encounter is always counted, before any decision is made. When the
    /// visited set is already full the stop flag is raised and every in-flight
    /// fetch is cancelled.
    pub fn admit(&self, key: &str) -> Admission {
        let mut inner = self.lock();

        *inner.visits.entry(key.to_string()).or_insert(0) += 1;

        if inner.visited.contains(key) {
            return Admission::AlreadyVisited;
        }

        if inner.visited.len() >= self.max_pages {
            let first = !inner.budget_exhausted;
            inner.budget_exhausted = true;
            self.cancel.cancel();
            if first {
                tracing::info!(
                    "Page budget of {} reached at {}, stopping crawl",
                    self.max_pages,
                    key
                );
            }
            return Admission::BudgetExhausted { first };
        }

        inner.visited.insert(key.to_string());
        Admission::Admitted
    }

    /// Returns true once the crawl has been told to stop
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Records how a branch ended
    pub fn record_outcome(&self, outcome: BranchOutcome) {
        *self.lock().outcomes.entry(outcome).or_insert(0) += 1;
    }

    /// Number of keys admitted so far
    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Encounter count for a key
    pub fn visit_count(&self, key: &str) -> u64 {
        self.lock().visits.get(key).copied().unwrap_or(0)
    }

    /// Takes the accumulated state out of the ledger
    pub fn take_snapshot(&self) -> LedgerSnapshot {
        let mut inner = self.lock();
        LedgerSnapshot {
            visits: std::mem::take(&mut inner.visits),
            visited: std::mem::take(&mut inner.visited),
            outcomes: std::mem::take(&mut inner.outcomes),
            budget_exhausted: inner.budget_exhausted,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
