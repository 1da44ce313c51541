//! URL handling module for sitecrawl
//!
//! This module provides the deduplication key used by the crawler, resolution
//! of relative references found in pages, and hostname comparison for the
//! same-host filter.

mod domain;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::{extract_domain, is_same_host};
pub use normalize::{normalize_parsed, normalize_url};
pub use resolve::{resolve_all, resolve_reference};
