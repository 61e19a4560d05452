//! Integration tests for repo-discovery
//!
//! These tests use wiremock to serve directory listings and run the
//! fetcher, the pipeline and the product parsers against them end-to-end.

mod common;
mod discovery_tests;
mod fetcher_tests;
