//! Release values assembled by the crawl pipeline
//!
//! A [`Release`] is built up one directory level at a time. Steps never
//! modify a release: they return [`Fragment`]s, and the pipeline merges each
//! fragment into a copy of its parent. That keeps concurrent branches of the
//! crawl independent of each other.

mod record;

pub use record::ReleaseRecord;

use crate::crawler::Link;
use crate::url::{ensure_trailing_slash, resolve_href};

/// Named string fields a step may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Version,
    Platform,
    PlatformVersion,
    Architecture,
    /// Path remembered for building the final repository reference
    RepoUrl,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Version => "version",
            Self::Platform => "platform",
            Self::PlatformVersion => "platform_version",
            Self::Architecture => "architecture",
            Self::RepoUrl => "repo_url",
        }
    }
}

/// A release in progress
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Release {
    /// Current crawl position, always ends with `/`
    pub url: String,
    pub version: Option<String>,
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    pub architecture: Option<String>,
    pub repo_url: Option<String>,
    /// Final repository reference, set by the terminal step
    pub repo: Option<String>,
    pub repo_key: Option<String>,
    pub product: Option<String>,
    /// Directory names accumulated by the recursive variant
    pub version_path: Vec<String>,
}

impl Release {
    /// The single release a crawl starts from
    pub fn seed(base_url: &str) -> Self {
        Self {
            url: ensure_trailing_slash(base_url),
            ..Self::default()
        }
    }

    pub fn field(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Version => &self.version,
            Field::Platform => &self.platform,
            Field::PlatformVersion => &self.platform_version,
            Field::Architecture => &self.architecture,
            Field::RepoUrl => &self.repo_url,
        };
        value.as_deref()
    }

    fn set_field(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Version => &mut self.version,
            Field::Platform => &mut self.platform,
            Field::PlatformVersion => &mut self.platform_version,
            Field::Architecture => &mut self.architecture,
            Field::RepoUrl => &mut self.repo_url,
        };
        *slot = Some(value);
    }

    /// Produces the child release described by a fragment
    ///
    /// Fields set by the fragment overwrite the parent's, everything else is
    /// inherited. The next URL is the fragment's link resolved against the
    /// parent URL, else the fragment's explicit URL, else the parent URL;
    /// it always ends with `/`. The link itself is not carried over.
    pub fn merge(&self, fragment: Fragment) -> Release {
        let mut next = self.clone();

        let url = match (&fragment.link, fragment.url) {
            (Some(link), _) => resolve_href(&self.url, &link.href),
            (None, Some(url)) => url,
            (None, None) => self.url.clone(),
        };
        next.url = ensure_trailing_slash(&url);

        for (field, value) in fragment.fields {
            next.set_field(field, value);
        }
        if let Some(path) = fragment.version_path {
            next.version_path = path;
        }
        if let Some(repo) = fragment.repo {
            next.repo = Some(repo);
        }

        next
    }
}

/// The output of a step for one candidate child release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Directory link to descend into; lives only until the merge
    pub link: Option<Link>,
    /// Explicit next URL, used when no link is given
    pub url: Option<String>,
    pub fields: Vec<(Field, String)>,
    pub version_path: Option<Vec<String>>,
    pub repo: Option<String>,
}

impl Fragment {
    /// A fragment that keeps the parent's position
    pub fn stay() -> Self {
        Self::default()
    }

    /// A fragment that descends into a listed directory
    pub fn at_link(link: &Link) -> Self {
        Self {
            link: Some(link.clone()),
            ..Self::default()
        }
    }

    /// A fragment that moves to an explicit URL
    pub fn at_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    pub fn with_version_path(mut self, path: Vec<String>) -> Self {
        self.version_path = Some(path);
        self
    }

    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = Some(repo.into());
        self
    }
}
