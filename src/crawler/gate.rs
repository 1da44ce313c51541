//! Bounded fetch gate
//!
//! Admits at most N operations at a time. Waiters are served in FIFO order
//! because tokio's semaphore is fair. The gate only bounds outbound work;
//! traversal branches waiting for a slot are not limited.

use crate::CrawlError;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Concurrency limiter for fetch operations
#[derive(Debug, Clone)]
pub struct FetchGate {
    semaphore: Arc<Semaphore>,
    counters: Arc<GateCounters>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct GateCounters {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    admitted: AtomicUsize,
}

/// Decrements the in-flight count when an admitted operation finishes or is dropped
struct InFlightGuard<'a>(&'a GateCounters);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl FetchGate {
    /// Creates a gate admitting `capacity` concurrent operations (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            counters: Arc::new(GateCounters::default()),
            capacity,
        }
    }

    /// Runs `operation` once a slot is free and returns its output
    ///
    /// The slot is held until the operation completes (or its future is dropped).
    pub async fn admit<F, T>(&self, operation: F) -> Result<T, CrawlError>
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| CrawlError::GateClosed)?;

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.peak.fetch_max(now, Ordering::SeqCst);
        self.counters.admitted.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.counters);

        Ok(operation.await)
    }

    /// Maximum number of concurrent operations
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Operations executing right now
    pub fn in_flight(&self) -> usize {
        self.counters.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of operations that ever executed at once
    pub fn peak(&self) -> usize {
        self.counters.peak.load(Ordering::SeqCst)
    }

    /// Total operations admitted so far
    pub fn admitted(&self) -> usize {
        self.counters.admitted.load(Ordering::SeqCst)
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_CONCURRENCY as usize)
    }
}
