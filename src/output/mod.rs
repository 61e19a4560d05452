//! Output of a discovery run
//!
//! This module handles:
//! - Writing release records as a JSON array
//! - Summarizing per-product results and crawl counters

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics, CrawlStats};

use crate::release::ReleaseRecord;
use crate::Result;
use std::io::Write;

/// Outcome of discovering one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSummary {
    pub product: String,
    pub releases: usize,
    pub attempts: u32,
    /// Error of the last attempt when every attempt failed
    pub error: Option<String>,
}

impl ProductSummary {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Writes release records as a pretty-printed JSON array
///
/// Records are sorted first so that unchanged repositories produce
/// byte-identical output.
pub fn write_releases<W: Write>(writer: &mut W, records: &[ReleaseRecord]) -> Result<()> {
    let mut sorted = records.to_vec();
    sorted.sort();
    sorted.dedup();

    serde_json::to_writer_pretty(&mut *writer, &sorted)?;
    writeln!(writer)?;
    Ok(())
}

/// Renders one summary line per product
pub fn format_summary(summaries: &[ProductSummary]) -> String {
    let mut out = String::new();
    for summary in summaries {
        let line = match &summary.error {
            None => format!(
                "  + {}: {} releases ({} attempt(s))\n",
                summary.product, summary.releases, summary.attempts
            ),
            Some(error) => format!(
                "  - {}: failed after {} attempt(s): {}\n",
                summary.product, summary.attempts, error
            ),
        };
        out.push_str(&line);
    }
    out
}

/// Prints the product summaries and crawl counters to stderr
pub fn print_summary(summaries: &[ProductSummary], stats: &CrawlStatistics) {
    eprintln!("=== Discovery Summary ===\n");
    eprint!("{}", format_summary(summaries));
    eprintln!();
    print_statistics(stats);
}
