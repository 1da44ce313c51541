//! Statistics computed from a finished crawl
//!
//! This module provides a summary view of a `CrawlReport` and prints it.

use crate::crawler::CrawlReport;
use crate::state::BranchOutcome;
use std::collections::HashMap;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Distinct normalized URLs encountered on the seed host
    pub distinct_urls: u64,

    /// Total link encounters, counting repeats
    pub total_encounters: u64,

    /// Pages admitted for fetching
    pub pages_visited: u64,

    /// Pages whose body was extracted
    pub pages_extracted: u64,

    /// Branches that ended with an extracted page, degraded or not
    pub successes: u64,

    /// Fetch failures of any kind
    pub failures: u64,

    /// Branches that ended before reaching the fetch step
    pub skipped: u64,

    /// Count of branches by outcome
    pub outcomes: HashMap<BranchOutcome, u64>,

    /// Highest number of simultaneous fetches
    pub peak_concurrent_fetches: usize,

    /// Whether the page budget ended the crawl
    pub budget_exhausted: bool,

    /// Whether the crawl was cancelled from outside
    pub interrupted: bool,

    /// Crawl duration in seconds
    pub elapsed_secs: f64,
}

impl CrawlStatistics {
    /// Summarizes a crawl report
    pub fn from_report(report: &CrawlReport) -> Self {
        let total_of = |pred: fn(&BranchOutcome) -> bool| -> u64 {
            report
                .outcomes
                .iter()
                .filter(|(outcome, _)| pred(*outcome))
                .map(|(_, count)| count)
                .sum()
        };

        Self {
            distinct_urls: report.visits.len() as u64,
            total_encounters: report.visits.values().sum(),
            pages_visited: report.visited.len() as u64,
            pages_extracted: report.pages.len() as u64,
            successes: total_of(BranchOutcome::is_success),
            failures: total_of(BranchOutcome::is_error),
            skipped: total_of(BranchOutcome::is_skipped),
            outcomes: report.outcomes.clone(),
            peak_concurrent_fetches: report.peak_concurrent_fetches,
            budget_exhausted: report.budget_exhausted,
            interrupted: report.interrupted,
            elapsed_secs: report.elapsed.as_secs_f64(),
        }
    }

    /// Pages per second over the whole crawl
    pub fn pages_per_second(&self) -> f64 {
        if self.elapsed_secs > 0.0 {
            self.pages_visited as f64 / self.elapsed_secs
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Distinct URLs seen: {}", stats.distinct_urls);
    println!("  Link encounters: {}", stats.total_encounters);
    println!("  Pages visited: {}", stats.pages_visited);
    println!("  Pages extracted: {}", stats.pages_extracted);
    println!("  Successful branches: {}", stats.successes);
    println!("  Fetch failures: {}", stats.failures);
    println!("  Skipped branches: {}", stats.skipped);
    println!("  Peak concurrent fetches: {}", stats.peak_concurrent_fetches);
    println!(
        "  Duration: {:.2}s ({:.2} pages/sec)",
        stats.elapsed_secs,
        stats.pages_per_second()
    );
    if stats.budget_exhausted {
        println!("  Stopped: page budget reached");
    } else if stats.interrupted {
        println!("  Stopped: interrupted");
    }
    println!();

    println!("Branches by Outcome:");
    let mut outcome_counts: Vec<_> = stats.outcomes.iter().collect();
    outcome_counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    let total: u64 = stats.outcomes.values().sum();
    for (outcome, count) in outcome_counts {
        let percentage = if total > 0 {
            (*count as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", outcome, count, percentage);
    }
}
