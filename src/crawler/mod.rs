//! Crawler module for repository directory listings
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`LinkSource`] trait
//! - HTML parsing and directory link extraction
//! - The step pipeline engine, bounded and recursive
//! - Package verification of resolved releases
//! - Signing key lookup in build directories

mod fetcher;
mod keys;
mod parser;
mod pipeline;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{build_http_client, HttpLinkSource, LinkSource};
pub use keys::KeySource;
pub use parser::{anchor_markup, directory_links, parse_links, Link};
pub use pipeline::{Pipeline, RepositorySpec, MAX_STEP_DEPTH};
pub use verify::{remove_corrupted_releases, ListingUrl, PackageCheck, PackagePattern, Series};
