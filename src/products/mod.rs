//! Product parsers
//!
//! Every product family publishes its packages with its own directory
//! conventions. A parser only describes them: which repository trees to
//! crawl, which steps walk each tree, and which packages a finished release
//! must list. All of it is resolved from configuration before the first
//! request is sent, so configuration errors never leave a partial result.

mod columnstore;
mod connector_ci;
mod galera_ci;
mod galera_enterprise_ci;
mod mariadb;
mod mariadb_ci;
mod mariadb_staging;
mod maxscale;
mod maxscale_ci;
mod maxscale_ci_docker;
mod mdbe_ci;
mod mdbe_prestaging;
mod mysql;

use crate::config::{Config, Credentials, RepoSource};
use crate::crawler::{KeySource, LinkSource, PackageCheck, Pipeline, RepositorySpec};
use crate::output::CrawlStats;
use crate::release::{Field, Release, ReleaseRecord};
use crate::steps::{PipelineStep, Step};
use crate::url::with_optional_auth;
use crate::{ConfigResult, DiscoveryError, FetchResult, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Directory holding a single release version such as `10.5` or `10.5.8`
pub(crate) const VERSION_DIR: &str = r"^(\d+\.\d+(\.\d+)?)/?$";

/// Numeric platform version directory such as `8`
pub(crate) const PLATFORM_VERSION_DIR: &str = r"^(\d+)/?$";

/// Supported product families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Product {
    Mariadb,
    Maxscale,
    Mysql,
    Columnstore,
    MaxscaleCi,
    MariadbCi,
    GaleraCi,
    GaleraEnterpriseCi,
    MdbeCi,
    MaxscaleCiDocker,
    ConnectorCCi,
    ConnectorCppCi,
    ConnectorOdbcCi,
    MariadbStaging,
    MdbePrestaging,
}

impl Product {
    pub const ALL: [Product; 15] = [
        Product::Mariadb,
        Product::Maxscale,
        Product::Mysql,
        Product::Columnstore,
        Product::MaxscaleCi,
        Product::MariadbCi,
        Product::GaleraCi,
        Product::GaleraEnterpriseCi,
        Product::MdbeCi,
        Product::MaxscaleCiDocker,
        Product::ConnectorCCi,
        Product::ConnectorCppCi,
        Product::ConnectorOdbcCi,
        Product::MariadbStaging,
        Product::MdbePrestaging,
    ];

    /// Name used in configuration and in emitted records
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mariadb => "mariadb",
            Self::Maxscale => "maxscale",
            Self::Mysql => "mysql",
            Self::Columnstore => "columnstore",
            Self::MaxscaleCi => "maxscale_ci",
            Self::MariadbCi => "mariadb_ci",
            Self::GaleraCi => "galera_ci",
            Self::GaleraEnterpriseCi => "galera_enterprise_ci",
            Self::MdbeCi => "mdbe_ci",
            Self::MaxscaleCiDocker => "maxscale_ci_docker",
            Self::ConnectorCCi => "connector_c_ci",
            Self::ConnectorCppCi => "connector_cpp_ci",
            Self::ConnectorOdbcCi => "connector_odbc_ci",
            Self::MariadbStaging => "mariadb_staging",
            Self::MdbePrestaging => "mdbe_prestaging",
        }
    }

    fn plans(&self, config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
        match self {
            Self::Mariadb => mariadb::plans(config),
            Self::Maxscale => maxscale::plans(config),
            Self::Mysql => mysql::plans(config),
            Self::Columnstore => columnstore::plans(config),
            Self::MaxscaleCi => maxscale_ci::plans(config),
            Self::MariadbCi => mariadb_ci::plans(config),
            Self::GaleraCi => galera_ci::plans(config),
            Self::GaleraEnterpriseCi => galera_enterprise_ci::plans(config),
            Self::MdbeCi => mdbe_ci::plans(config),
            Self::MaxscaleCiDocker => Ok(Vec::new()),
            Self::ConnectorCCi | Self::ConnectorCppCi | Self::ConnectorOdbcCi => {
                connector_ci::plans(config, *self)
            }
            Self::MariadbStaging => mariadb_staging::plans(config),
            Self::MdbePrestaging => mdbe_prestaging::plans(config),
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Product {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|product| product.name() == s)
            .ok_or_else(|| DiscoveryError::UnknownProduct {
                name: s.to_string(),
                known: Self::ALL.map(|p| p.name()).join(", "),
            })
    }
}

/// Everything a discovery run shares between products
#[derive(Clone)]
pub struct DiscoveryContext {
    pub config: Arc<Config>,
    pub source: Arc<dyn LinkSource>,
    /// Only releases of this version are reported
    pub product_version: Option<String>,
    pub stats: Arc<CrawlStats>,
}

impl DiscoveryContext {
    pub fn new(config: Arc<Config>, source: Arc<dyn LinkSource>) -> Self {
        Self {
            config,
            source,
            product_version: None,
            stats: Arc::new(CrawlStats::new()),
        }
    }

    pub fn with_product_version(mut self, product_version: Option<String>) -> Self {
        self.product_version = product_version;
        self
    }

    pub fn with_stats(mut self, stats: Arc<CrawlStats>) -> Self {
        self.stats = stats;
        self
    }

    fn pipeline(&self, auth: Option<Credentials>) -> Pipeline {
        Pipeline::new(self.source.clone(), self.config.crawler.worker_pool_size)
            .with_auth(auth)
            .with_product_version(self.product_version.clone())
            .with_stats(self.stats.clone())
    }
}

/// Step list of one repository tree
#[derive(Debug, Clone)]
pub(crate) enum Steps {
    Bounded(Vec<Step>),
    Recursive(Vec<PipelineStep>),
}

/// One repository tree of a product, ready to crawl
#[derive(Debug, Clone)]
pub(crate) struct CrawlPlan {
    pub repository: RepositorySpec,
    pub auth: Option<Credentials>,
    pub steps: Steps,
    /// Platforms to keep, all when empty
    pub platforms: Vec<String>,
    /// Versions to keep, all when empty
    pub versions: Vec<String>,
}

impl CrawlPlan {
    pub fn new(
        product: Product,
        source: &RepoSource,
        auth: Option<Credentials>,
        check: PackageCheck,
        steps: Steps,
    ) -> Self {
        Self {
            repository: RepositorySpec {
                base_url: source.path.clone(),
                key: signing_key(source, auth.as_ref()),
                key_source: KeySource::Configured,
                product: source
                    .product_name
                    .clone()
                    .unwrap_or_else(|| product.name().to_string()),
                check,
            },
            auth,
            steps,
            platforms: source.platforms.clone(),
            versions: source.versions.clone(),
        }
    }

    /// Reads the signing key from the build directories of the releases
    pub fn with_key_source(mut self, key_source: KeySource) -> Self {
        self.repository.key_source = key_source;
        self
    }

    async fn run(&self, ctx: &DiscoveryContext) -> FetchResult<Vec<Release>> {
        let pipeline = ctx.pipeline(self.auth.clone());
        let releases = match &self.steps {
            Steps::Bounded(steps) => pipeline.parse_repository(&self.repository, steps).await,
            Steps::Recursive(steps) => {
                pipeline
                    .parse_repository_recursive(&self.repository, steps)
                    .await
            }
        }?;

        Ok(releases
            .into_iter()
            .filter(|release| allowed(&self.platforms, release.field(Field::Platform)))
            .filter(|release| allowed(&self.versions, release.field(Field::Version)))
            .collect())
    }
}

fn allowed(list: &[String], value: Option<&str>) -> bool {
    list.is_empty() || value.map_or(false, |value| list.iter().any(|entry| entry == value))
}

/// The configured key, with credentials embedded when the repository needs them
fn signing_key(source: &RepoSource, auth: Option<&Credentials>) -> Option<String> {
    if source.key.is_empty() {
        None
    } else {
        Some(with_optional_auth(&source.key, auth))
    }
}

/// Discovers every release of a product
///
/// Configuration problems (a missing repository, unresolvable credentials)
/// are returned before anything is fetched. A repository root that cannot be
/// listed fails the product with [`DiscoveryError::Fetch`]; failures deeper
/// in a tree only shrink the result and are reported through the log and
/// the context's counters.
///
/// # Example
///
/// ```no_run
/// use repo_discovery::config::load_config;
/// use repo_discovery::{discover, DiscoveryContext, HttpLinkSource, Product};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn run() -> repo_discovery::Result<()> {
/// let config = load_config(Path::new("discovery.toml"))?;
/// let source = HttpLinkSource::from_config(&config.crawler, &config.user_agent)?;
/// let ctx = DiscoveryContext::new(Arc::new(config), Arc::new(source));
/// let records = discover(Product::Maxscale, &ctx).await?;
/// # Ok(())
/// # }
/// ```
pub async fn discover(product: Product, ctx: &DiscoveryContext) -> Result<Vec<ReleaseRecord>> {
    if product == Product::MaxscaleCiDocker {
        return maxscale_ci_docker::discover(ctx).await;
    }

    let plans = product.plans(&ctx.config)?;

    let mut records = Vec::new();
    for plan in &plans {
        let releases = plan.run(ctx).await?;
        records.extend(into_records(releases));
    }

    tracing::info!("{}: {} releases discovered", product, records.len());
    Ok(records)
}

/// Runs [`discover`] up to `attempts` times
///
/// Stops at the first success or at an error that is not
/// [retryable](DiscoveryError::is_retryable). Returns the last result and
/// the number of attempts used.
pub async fn discover_with_retries(
    product: Product,
    ctx: &DiscoveryContext,
    attempts: u32,
) -> (Result<Vec<ReleaseRecord>>, u32) {
    let mut attempt = 1;
    loop {
        let result = discover(product, ctx).await;
        match &result {
            Err(e) if e.is_retryable() && attempt < attempts => {
                tracing::warn!("Attempt {} for {} failed: {}, retrying", attempt, product, e);
                attempt += 1;
            }
            _ => return (result, attempt),
        }
    }
}

fn into_records(releases: Vec<Release>) -> Vec<ReleaseRecord> {
    releases
        .into_iter()
        .filter_map(|release| match ReleaseRecord::try_from(release) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping release: {}", e);
                None
            }
        })
        .collect()
}

/// Repository and required credentials of an authenticated product
fn authenticated<'a>(
    config: &'a Config,
    product: Product,
    repository: &str,
) -> ConfigResult<(&'a RepoSource, Credentials)> {
    let source = config.repository(product.name(), repository)?;
    let credentials = config.required_credentials(product.name(), source)?;
    Ok((source, credentials))
}
