//! Output module for crawl reports
//!
//! This module handles:
//! - Writing the per-page CSV report
//! - Computing and printing crawl statistics

mod csv_report;
pub mod stats;

pub use csv_report::{write_csv_report, write_csv_report_to_path, CSV_HEADERS};
pub use stats::{print_statistics, CrawlStatistics};
