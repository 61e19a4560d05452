//! In-memory directory tree for engine tests

use crate::config::Credentials;
use crate::crawler::fetcher::LinkSource;
use crate::crawler::parser::{directory_links, parse_links, Link};
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    entries: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    endless: Option<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists sub-directories at `url`
    pub fn with_dirs(mut self, url: &str, names: &[&str]) -> Self {
        let entries = self.entries.entry(url.to_string()).or_default();
        entries.extend(names.iter().map(|name| format!("{}/", name)));
        self
    }

    /// Lists plain files at `url`
    pub fn with_files(mut self, url: &str, names: &[&str]) -> Self {
        let entries = self.entries.entry(url.to_string()).or_default();
        entries.extend(names.iter().map(|name| name.to_string()));
        self
    }

    /// Makes every fetch of `url` fail with HTTP 500
    pub fn with_failure(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Every URL below `prefix` lists a single sub-directory `d/`
    pub fn with_endless_tree(mut self, prefix: &str) -> Self {
        self.endless = Some(prefix.to_string());
        self
    }

    pub fn dirs_at(&self, url: &str) -> Vec<Link> {
        self.render(url)
            .map(|html| directory_links(parse_links(&html)))
            .unwrap_or_default()
    }

    fn render(&self, url: &str) -> Option<String> {
        let entries = match (&self.endless, self.entries.get(url)) {
            (_, Some(entries)) => entries.clone(),
            (Some(prefix), None) if url.starts_with(prefix.as_str()) => vec!["d/".to_string()],
            _ => return None,
        };

        let anchors: String = std::iter::once("../".to_string())
            .chain(entries)
            .map(|entry| format!("<a href=\"{0}\">{0}</a>\n", entry))
            .collect();
        Some(format!("<html><body><pre>\n{}</pre></body></html>", anchors))
    }
}

#[async_trait]
impl LinkSource for MemorySource {
    async fn fetch_page(&self, url: &str, _auth: Option<&Credentials>) -> FetchResult<String> {
        if self.failing.contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        self.render(url).ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
