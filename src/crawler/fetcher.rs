//! HTTP fetcher implementation
//!
//! This module isolates all network I/O of a discovery run:
//! - Building the HTTP client with timeouts and a user agent string
//! - Fetching listing pages with optional HTTP Basic credentials
//! - Classifying transport, timeout and status failures
//!
//! The pipeline only talks to the [`LinkSource`] trait, so tests can replace
//! the network with an in-memory directory tree.

use crate::config::{CrawlerConfig, Credentials, UserAgentConfig};
use crate::crawler::parser::{anchor_markup, directory_links, parse_links, Link};
use crate::url::collapse_slashes;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Source of listing pages
///
/// Implementors provide [`LinkSource::fetch_page`]; link extraction and
/// markup collection are derived from it.
#[async_trait]
pub trait LinkSource: Send + Sync {
    /// Fetches the raw body of a page
    async fn fetch_page(&self, url: &str, auth: Option<&Credentials>) -> FetchResult<String>;

    /// Fetches a page and extracts every anchor on it
    async fn fetch_links(&self, url: &str, auth: Option<&Credentials>) -> FetchResult<Vec<Link>> {
        let body = self.fetch_page(url, auth).await?;
        Ok(parse_links(&body))
    }

    /// Fetches a page and keeps only its sub-directory links
    async fn directory_links(
        &self,
        url: &str,
        auth: Option<&Credentials>,
    ) -> FetchResult<Vec<Link>> {
        let links = self.fetch_links(url, auth).await?;
        Ok(directory_links(links))
    }

    /// Markup of every anchor on a page, or an empty string if the page
    /// cannot be fetched
    async fn anchor_markup(&self, url: &str, auth: Option<&Credentials>) -> String {
        match self.fetch_page(url, auth).await {
            Ok(body) => anchor_markup(&body),
            Err(e) => {
                tracing::debug!("No package listing at {}: {}", url, e);
                String::new()
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `crawler` - Timeout settings
/// * `user_agent` - Name and version sent in the `User-Agent` header
///
/// # Example
///
/// ```no_run
/// use repo_discovery::config::{CrawlerConfig, UserAgentConfig};
/// use repo_discovery::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default(), &UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    crawler: &CrawlerConfig,
    user_agent: &UserAgentConfig,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", user_agent.crawler_name, user_agent.crawler_version);

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(crawler.request_timeout_secs))
        .connect_timeout(Duration::from_secs(crawler.connect_timeout_secs))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`LinkSource`] backed by real HTTP requests
#[derive(Debug, Clone)]
pub struct HttpLinkSource {
    client: Client,
}

impl HttpLinkSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the client from configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(crawler, user_agent)?))
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::InvalidUrl {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl LinkSource for HttpLinkSource {
    async fn fetch_page(&self, url: &str, auth: Option<&Credentials>) -> FetchResult<String> {
        let url = collapse_slashes(url);
        tracing::debug!("Loading URL '{}'", url);

        let mut request = self.client.get(&url);
        if let Some(credentials) = auth {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().await.map_err(|e| classify(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify(&url, e))
    }
}
