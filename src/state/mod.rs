//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the visit ledger, visited set and page budget, with the atomic admission step
//! - `BranchOutcome`: how each traversal branch ended

mod branch_state;
mod ledger;

// Re-export main types
pub use branch_state::BranchOutcome;
pub use ledger::{Admission, CrawlState, LedgerSnapshot};
