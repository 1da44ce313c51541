//! CSV page report
//!
//! One row per extracted page, sorted by normalized URL. Link and image lists
//! are joined with `;`. Fields are quoted only when they contain a comma, a
//! quote or a line break, and embedded quotes are doubled.

use crate::crawler::ExtractedPage;
use crate::CrawlError;
use csv::{QuoteStyle, WriterBuilder};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

/// Column headers of the page report
pub const CSV_HEADERS: [&str; 5] = ["url", "heading", "first_paragraph", "links", "images"];

/// Writes the page report to any writer
pub fn write_csv_report<W: Write>(
    writer: W,
    pages: &HashMap<String, ExtractedPage>,
) -> Result<(), CrawlError> {
    let mut csv = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    csv.write_record(CSV_HEADERS)?;

    let mut keys: Vec<&String> = pages.keys().collect();
    keys.sort();

    for key in keys {
        let page = &pages[key];
        csv.write_record([
            page.url.as_str(),
            page.heading.as_str(),
            page.first_paragraph.as_str(),
            page.links.join(";").as_str(),
            page.images.join(";").as_str(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes the page report to a file, replacing any existing one
pub fn write_csv_report_to_path(
    path: &Path,
    pages: &HashMap<String, ExtractedPage>,
) -> Result<(), CrawlError> {
    let file = std::fs::File::create(path)?;
    write_csv_report(file, pages)?;
    tracing::info!("Wrote {} page records to {}", pages.len(), path.display());
    Ok(())
}
