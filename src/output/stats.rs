//! Counters for a discovery run
//!
//! Crawling drops releases instead of failing. These counters make the drops
//! visible in the run summary.

use std::sync::atomic::{AtomicU64, Ordering};

/// Shared counters, updated concurrently by the pipeline
#[derive(Debug, Default)]
pub struct CrawlStats {
    pages_fetched: AtomicU64,
    fetch_failures: AtomicU64,
    depth_exceeded: AtomicU64,
    corrupted: AtomicU64,
}

/// Point-in-time copy of [`CrawlStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    pub pages_fetched: u64,
    /// Releases dropped because their listing could not be fetched
    pub fetch_failures: u64,
    /// Releases dropped by the recursion cap
    pub depth_exceeded: u64,
    /// Releases dropped by package verification
    pub corrupted: u64,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&self) {
        self.pages_fetched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_depth_exceeded(&self, count: u64) {
        self.depth_exceeded.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_corrupted(&self, count: u64) {
        self.corrupted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CrawlStatistics {
        CrawlStatistics {
            pages_fetched: self.pages_fetched.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            depth_exceeded: self.depth_exceeded.load(Ordering::Relaxed),
            corrupted: self.corrupted.load(Ordering::Relaxed),
        }
    }
}

impl CrawlStatistics {
    /// Whether any release was dropped for a reason other than verification
    pub fn has_losses(&self) -> bool {
        self.fetch_failures > 0 || self.depth_exceeded > 0
    }
}

/// Prints statistics to stderr in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    eprintln!("=== Discovery Statistics ===\n");
    eprintln!("  Listing pages fetched: {}", stats.pages_fetched);
    eprintln!("  Fetch failures: {}", stats.fetch_failures);
    eprintln!("  Depth cap reached: {}", stats.depth_exceeded);
    eprintln!("  Failed package verification: {}", stats.corrupted);

    if stats.has_losses() {
        eprintln!("\nSome branches were dropped, the release list may be incomplete.");
    }
}
