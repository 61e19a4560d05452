//! Configuration module for repo-discovery
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use repo_discovery::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("repositories.toml")).unwrap();
//! println!("Worker pool size: {}", config.crawler.worker_pool_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, Credentials, LoggingConfig, ProductConfig, RepoSource,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{config_hash, load_config, load_config_with_hash, parse_config};
