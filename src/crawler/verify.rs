//! Corrupted-release filter
//!
//! A directory tree can be fully resolved and still host no packages (stale
//! mirrors, empty platform folders). Every finished release is checked
//! against the anchors of its package listing before it is reported.

use crate::config::Credentials;
use crate::crawler::fetcher::LinkSource;
use crate::release::Release;
use crate::url::{go_up, resolve_href};
use futures::stream::{self, StreamExt};
use regex::Regex;

/// Which part of a release's version names its pool directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Series {
    /// `major.minor` of the version, or `fallback` when it has none
    MajorMinor { fallback: Option<String> },
    /// The version as crawled
    Version,
}

impl Series {
    fn of(&self, release: &Release) -> String {
        let version = release.version.as_deref().unwrap_or_default();
        match self {
            Self::Version => version.to_string(),
            Self::MajorMinor { fallback } => major_minor(version)
                .map(str::to_string)
                .or_else(|| fallback.clone())
                .unwrap_or_else(|| version.to_string()),
        }
    }
}

/// Leading `<digits>.<digits>` of a version
fn major_minor(version: &str) -> Option<&str> {
    let (major, rest) = version.split_once('.')?;
    let minor_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    if major.is_empty() || !major.bytes().all(|b| b.is_ascii_digit()) || minor_len == 0 {
        return None;
    }
    Some(&version[..major.len() + 1 + minor_len])
}

/// Where the package listing of a finished release lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingUrl {
    /// The release URL itself
    Current,
    /// The release URL with a suffix such as `rpms/`
    Append(String),
    /// A Debian pool directory: go up `levels_up` segments, then append
    /// `template` with `{series}` substituted
    Pool {
        levels_up: usize,
        template: String,
        series: Series,
    },
    /// The first directory listed under a pool, or the pool itself when it
    /// cannot be listed
    FirstPoolSubdirectory { levels_up: usize, pool: String },
}

impl ListingUrl {
    pub fn append(suffix: &str) -> Self {
        Self::Append(suffix.to_string())
    }

    pub fn pool(levels_up: usize, template: &str, series: Series) -> Self {
        Self::Pool {
            levels_up,
            template: template.to_string(),
            series,
        }
    }

    pub fn first_pool_subdirectory(levels_up: usize, pool: &str) -> Self {
        Self::FirstPoolSubdirectory {
            levels_up,
            pool: pool.to_string(),
        }
    }

    /// Computes the listing URL for a release
    pub async fn resolve(
        &self,
        source: &dyn LinkSource,
        release: &Release,
        auth: Option<&Credentials>,
    ) -> String {
        match self {
            Self::Current => release.url.clone(),
            Self::Append(suffix) => format!("{}{}", release.url, suffix),
            Self::Pool {
                levels_up,
                template,
                series,
            } => {
                let path = template.replace("{series}", &series.of(release));
                format!("{}{}", go_up(&release.url, *levels_up), path)
            }
            Self::FirstPoolSubdirectory { levels_up, pool } => {
                let pool_url = format!("{}{}", go_up(&release.url, *levels_up), pool);
                match source.directory_links(&pool_url, auth).await {
                    Ok(links) => match links.first() {
                        Some(link) => resolve_href(&pool_url, &link.href),
                        None => pool_url,
                    },
                    Err(e) => {
                        tracing::debug!("Pool {} not listable: {}", pool_url, e);
                        pool_url
                    }
                }
            }
        }
    }
}

/// How a required package is recognised in listing markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePattern {
    /// The package name anywhere
    Name,
    /// The package name followed later by the platform version, as in
    /// `mariadb-server_10.5.8+maria~focal_amd64.deb`
    NameThenPlatformVersion,
}

impl PackagePattern {
    pub fn build(&self, package: &str, platform_version: Option<&str>) -> Result<Regex, regex::Error> {
        let package = regex::escape(package);
        match self {
            Self::Name => Regex::new(&package),
            Self::NameThenPlatformVersion => Regex::new(&format!(
                "{}.*{}",
                package,
                regex::escape(platform_version.unwrap_or_default())
            )),
        }
    }

    fn matches(&self, package: &str, platform_version: Option<&str>, markup: &str) -> bool {
        match self.build(package, platform_version) {
            Ok(pattern) => pattern.is_match(markup),
            Err(_) => false,
        }
    }
}

/// Describes what a release must list to be kept
#[derive(Debug, Clone)]
pub struct PackageCheck {
    pub packages: Vec<String>,
    pub listing: ListingUrl,
    pub pattern: PackagePattern,
}

impl PackageCheck {
    pub fn new(packages: &[&str], listing: ListingUrl, pattern: PackagePattern) -> Self {
        Self {
            packages: packages.iter().map(|p| p.to_string()).collect(),
            listing,
            pattern,
        }
    }

    fn accepts(&self, release: &Release, markup: &str) -> bool {
        let platform_version = release.platform_version.as_deref();
        self.packages
            .iter()
            .all(|package| self.pattern.matches(package, platform_version, markup))
    }
}

/// Keeps only the releases whose package listing shows every required package
///
/// Listings are fetched concurrently, at most `workers` at a time. A listing
/// that cannot be fetched counts as empty. Dropped releases are not logged.
pub async fn remove_corrupted_releases(
    source: &dyn LinkSource,
    releases: Vec<Release>,
    check: &PackageCheck,
    auth: Option<&Credentials>,
    workers: usize,
) -> Vec<Release> {
    stream::iter(releases)
        .map(|release| async move {
            let listing = check.listing.resolve(source, &release, auth).await;
            let markup = source.anchor_markup(&listing, auth).await;
            check.accepts(&release, &markup).then_some(release)
        })
        .buffer_unordered(workers.max(1))
        .filter_map(|kept| async move { kept })
        .collect()
        .await
}
