//! repo-discovery: package repository release discovery
//!
//! This crate crawls package repository directory listings (RPM trees, Debian
//! archives, credential-protected CI mirrors) and resolves every published
//! release of a product into a flat list of release records.

pub mod config;
pub mod crawler;
pub mod output;
pub mod products;
pub mod release;
pub mod steps;
pub mod url;

use thiserror::Error;

/// Main error type for discovery operations
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Release at {url} is missing field '{field}'")]
    IncompleteRelease { url: String, field: &'static str },

    #[error("Unknown product '{name}', known products: {known}")]
    UnknownProduct { name: String, known: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DiscoveryError {
    /// Whether running the same discovery again may succeed
    ///
    /// Configuration problems and unknown products stay the same on every
    /// attempt; an unreachable repository may come back.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::HttpClient(_) | Self::Io(_))
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Product '{product}' requires credentials, none configured")]
    MissingCredentials { product: String },

    #[error("Credentials '{name}' referenced by product '{product}' are not defined")]
    UnknownCredentials { product: String, name: String },

    #[error("Product '{product}' has no '{repository}' repository configured")]
    MissingRepository { product: String, repository: String },
}

/// Errors raised while fetching a single listing page
///
/// A fetch error never aborts a discovery run: the pipeline drops the release
/// that needed the page and continues with its siblings.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL '{url}'")]
    InvalidUrl { url: String },
}

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{HttpLinkSource, Link, LinkSource, Pipeline};
pub use products::{discover, discover_with_retries, DiscoveryContext, Product};
pub use release::{Release, ReleaseRecord};
pub use steps::{Completion, PipelineStep, Step};
