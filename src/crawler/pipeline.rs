//! Step pipeline engine
//!
//! The pipeline folds an ordered list of steps over a single seed release.
//! Every step is one directory level: the listings of all in-flight releases
//! are fetched concurrently (bounded by the worker pool), the step turns each
//! listing into fragments, and the fragments are merged into child releases.
//!
//! Two variants exist:
//! - [`Pipeline::parse_repository`] applies each step exactly once
//! - [`Pipeline::parse_repository_recursive`] may repeat a step over several
//!   levels until its completion predicate holds, at most [`MAX_STEP_DEPTH`]
//!   times per release
//!
//! A listing that cannot be fetched drops only the release that needed it.
//! Only the seed listing is different: without it there is no repository to
//! crawl, and the error is returned to the caller.

use crate::config::Credentials;
use crate::crawler::fetcher::LinkSource;
use crate::crawler::keys::KeySource;
use crate::crawler::parser::Link;
use crate::crawler::verify::{remove_corrupted_releases, PackageCheck};
use crate::output::CrawlStats;
use crate::release::Release;
use crate::steps::{Completion, PipelineStep, Step};
use crate::{FetchError, FetchResult};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Maximum number of levels a recursive step may descend per release
pub const MAX_STEP_DEPTH: usize = 25;

/// One repository tree to crawl
#[derive(Debug, Clone)]
pub struct RepositorySpec {
    pub base_url: String,
    /// Stamped on every release that did not get a key from its steps
    pub key: Option<String>,
    /// Where a more specific key than `key` may be published
    pub key_source: KeySource,
    pub product: String,
    pub check: PackageCheck,
}

/// Crawl engine shared by all product parsers
#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn LinkSource>,
    auth: Option<Credentials>,
    product_version: Option<String>,
    workers: usize,
    stats: Arc<CrawlStats>,
}

enum Outcome {
    Completed(Release),
    Descended(Vec<Release>),
}

/// Releases of one pipeline level and the first listing that failed
#[derive(Default)]
struct Advanced {
    releases: Vec<Release>,
    failure: Option<FetchError>,
}

impl Advanced {
    fn record(&mut self, result: FetchResult<Vec<Release>>) {
        match result {
            Ok(children) => self.releases.extend(children),
            Err(e) => {
                if self.failure.is_none() {
                    self.failure = Some(e);
                }
            }
        }
    }

    /// A failed fetch is fatal only while the seed is the whole frontier
    fn into_releases(self, seed_level: bool) -> FetchResult<Vec<Release>> {
        match self.failure {
            Some(e) if seed_level => Err(e),
            _ => Ok(self.releases),
        }
    }
}

impl Pipeline {
    /// Creates a pipeline fetching through `source` with at most `workers`
    /// requests in flight
    pub fn new(source: Arc<dyn LinkSource>, workers: usize) -> Self {
        Self {
            source,
            auth: None,
            product_version: None,
            workers: workers.max(1),
            stats: Arc::new(CrawlStats::new()),
        }
    }

    /// Credentials sent with every listing request
    pub fn with_auth(mut self, auth: Option<Credentials>) -> Self {
        self.auth = auth;
        self
    }

    /// Only keep releases of this version
    pub fn with_product_version(mut self, product_version: Option<String>) -> Self {
        self.product_version = product_version;
        self
    }

    pub fn with_stats(mut self, stats: Arc<CrawlStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Crawls a repository applying every step exactly once
    ///
    /// # Arguments
    ///
    /// * `repository` - Base URL, key, product and package verification
    /// * `steps` - One step per directory level
    ///
    /// # Returns
    ///
    /// The verified releases stamped with key and product, in no particular
    /// order, or the fetch error of the base listing.
    pub async fn parse_repository(
        &self,
        repository: &RepositorySpec,
        steps: &[Step],
    ) -> FetchResult<Vec<Release>> {
        tracing::info!("Crawling {} for {}", repository.base_url, repository.product);

        let mut frontier = vec![Release::seed(&repository.base_url)];
        for (index, step) in steps.iter().enumerate() {
            frontier = self.advance(frontier, step).await.into_releases(index == 0)?;
            tracing::debug!("{} releases in flight", frontier.len());
        }

        Ok(self.finish(repository, frontier).await)
    }

    /// Crawls a repository whose steps may span several directory levels
    ///
    /// Steps without a completion predicate behave like in
    /// [`Pipeline::parse_repository`]. A step with a predicate keeps
    /// descending each release until the predicate holds on its listing;
    /// releases still descending after [`MAX_STEP_DEPTH`] levels are dropped.
    pub async fn parse_repository_recursive(
        &self,
        repository: &RepositorySpec,
        steps: &[PipelineStep],
    ) -> FetchResult<Vec<Release>> {
        tracing::info!("Crawling {} for {}", repository.base_url, repository.product);

        let mut frontier = vec![Release::seed(&repository.base_url)];
        for (index, pipeline_step) in steps.iter().enumerate() {
            let advanced = match &pipeline_step.complete_when {
                None => self.advance(frontier, &pipeline_step.step).await,
                Some(completion) => self.descend(frontier, &pipeline_step.step, completion).await,
            };
            frontier = advanced.into_releases(index == 0)?;
            tracing::debug!("{} releases in flight", frontier.len());
        }

        Ok(self.finish(repository, frontier).await)
    }

    /// Applies a step once to every release of the frontier
    async fn advance(&self, frontier: Vec<Release>, step: &Step) -> Advanced {
        let results: Vec<FetchResult<Vec<Release>>> = stream::iter(frontier)
            .map(|release| async move {
                let links = self.directory_links(&release).await?;
                Ok(expand(step, &release, &links))
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut advanced = Advanced::default();
        for result in results {
            advanced.record(result);
        }
        advanced.releases = self.filter_version(advanced.releases);
        advanced
    }

    /// Repeats a step level by level until each release completes
    ///
    /// Only failures of the first level are reported.
    async fn descend(&self, frontier: Vec<Release>, step: &Step, completion: &Completion) -> Advanced {
        let mut completed = Vec::new();
        let mut pending = frontier;
        let mut depth = 0;
        let mut first_failure = None;

        while !pending.is_empty() {
            if depth == MAX_STEP_DEPTH {
                tracing::warn!(
                    "Dropping {} releases still descending after {} levels, first at {}",
                    pending.len(),
                    MAX_STEP_DEPTH,
                    pending[0].url
                );
                self.stats.record_depth_exceeded(pending.len() as u64);
                break;
            }

            let outcomes: Vec<FetchResult<Outcome>> = stream::iter(pending)
                .map(|release| async move {
                    let links = self.directory_links(&release).await?;
                    if completion.is_complete(&links) {
                        Ok(Outcome::Completed(release))
                    } else {
                        Ok(Outcome::Descended(expand(step, &release, &links)))
                    }
                })
                .buffer_unordered(self.workers)
                .collect()
                .await;

            let mut next = Vec::new();
            for outcome in outcomes {
                match outcome {
                    Ok(Outcome::Completed(release)) => completed.push(release),
                    Ok(Outcome::Descended(children)) => next.extend(children),
                    Err(e) if depth == 0 && first_failure.is_none() => first_failure = Some(e),
                    Err(_) => {}
                }
            }

            pending = self.filter_version(next);
            depth += 1;
        }

        Advanced {
            releases: self.filter_version(completed),
            failure: first_failure,
        }
    }

    /// Verifies packages, then stamps key and product
    async fn finish(&self, repository: &RepositorySpec, releases: Vec<Release>) -> Vec<Release> {
        let resolved = releases.len();
        let verified = remove_corrupted_releases(
            self.source.as_ref(),
            releases,
            &repository.check,
            self.auth.as_ref(),
            self.workers,
        )
        .await;
        self.stats.record_corrupted((resolved - verified.len()) as u64);

        tracing::info!(
            "{}: {} of {} resolved releases verified at {}",
            repository.product,
            verified.len(),
            resolved,
            repository.base_url
        );

        let published = repository
            .key_source
            .lookup(self.source.as_ref(), &verified, self.auth.as_ref(), self.workers)
            .await;

        verified
            .into_iter()
            .map(|mut release| {
                if release.repo_key.is_none() {
                    release.repo_key = repository
                        .key_source
                        .directory(&release)
                        .and_then(|directory| published.get(&directory).cloned())
                        .or_else(|| repository.key.clone());
                }
                release.product = Some(repository.product.clone());
                release
            })
            .collect()
    }

    async fn directory_links(&self, release: &Release) -> FetchResult<Vec<Link>> {
        self.stats.record_fetch();
        let result = self.source.directory_links(&release.url, self.auth.as_ref()).await;
        if let Err(e) = &result {
            tracing::error!(
                "Unable to get information from link '{}', message: '{}'",
                release.url,
                e
            );
            self.stats.record_fetch_failure();
        }
        result
    }

    fn filter_version(&self, releases: Vec<Release>) -> Vec<Release> {
        match &self.product_version {
            None => releases,
            Some(wanted) => releases
                .into_iter()
                .filter(|release| matches_version(release, wanted))
                .collect(),
        }
    }
}

fn expand(step: &Step, release: &Release, links: &[Link]) -> Vec<Release> {
    step.apply(release, links)
        .into_iter()
        .map(|fragment| release.merge(fragment))
        .collect()
}

/// A release without a version yet always matches
fn matches_version(release: &Release, wanted: &str) -> bool {
    release.version.as_deref().map_or(true, |version| version == wanted)
}
