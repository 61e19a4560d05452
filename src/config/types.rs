use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Main configuration structure for repo-discovery
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Named credential sets referenced by repository sources
    #[serde(default)]
    pub credentials: BTreeMap<String, Credentials>,
    /// Repository sources per product, keyed by product name then by
    /// repository kind (`rpm`, `deb`, `es-rpm`, ...)
    #[serde(default)]
    pub products: BTreeMap<String, ProductConfig>,
}

/// Repository sources of a single product
pub type ProductConfig = BTreeMap<String, RepoSource>;

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of listing fetches in flight per fan-out level
    #[serde(rename = "worker-pool-size", default = "default_worker_pool_size")]
    pub worker_pool_size: usize,

    /// Total time allowed for a single request (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Time allowed to establish a connection (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// How many times a failed product discovery is attempted
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

fn default_worker_pool_size() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_attempts() -> u32 {
    3
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: default_worker_pool_size(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            attempts: default_attempts(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Path of the structured (JSON lines) log file
    #[serde(rename = "log-file")]
    pub log_file: Option<String>,
}

/// HTTP Basic credentials for a protected repository
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// A single repository tree to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct RepoSource {
    /// Base URL of the directory listing
    pub path: String,

    /// Signing key URL or inline key
    #[serde(default)]
    pub key: String,

    /// Name of the entry in `[credentials]` used for this repository
    #[serde(default)]
    pub credentials: Option<String>,

    #[serde(default)]
    pub platforms: Vec<String>,

    #[serde(default)]
    pub versions: Vec<String>,

    /// Product name stamped on the records of this repository, the
    /// product's own name when unset
    #[serde(rename = "product-name", default)]
    pub product_name: Option<String>,
}

impl Config {
    /// Looks up a repository source of a product
    pub fn repository(&self, product: &str, repository: &str) -> ConfigResult<&RepoSource> {
        self.products
            .get(product)
            .and_then(|repos| repos.get(repository))
            .ok_or_else(|| ConfigError::MissingRepository {
                product: product.to_string(),
                repository: repository.to_string(),
            })
    }

    /// Resolves the credentials a repository source refers to
    ///
    /// Returns `Ok(None)` when the source declares no credentials.
    pub fn credentials_for(
        &self,
        product: &str,
        source: &RepoSource,
    ) -> ConfigResult<Option<Credentials>> {
        match &source.credentials {
            None => Ok(None),
            Some(name) => self
                .credentials
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| ConfigError::UnknownCredentials {
                    product: product.to_string(),
                    name: name.clone(),
                }),
        }
    }

    /// Resolves credentials for a repository that cannot be read anonymously
    pub fn required_credentials(
        &self,
        product: &str,
        source: &RepoSource,
    ) -> ConfigResult<Credentials> {
        self.credentials_for(product, source)?
            .ok_or_else(|| ConfigError::MissingCredentials {
                product: product.to_string(),
            })
    }
}
