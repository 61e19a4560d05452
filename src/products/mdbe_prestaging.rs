//! MariaDB Enterprise prestaging repository
//!
//! Each version directory has an `rpm/` tree and a `deb/` archive, both
//! behind the enterprise credentials.

use super::{authenticated, CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::MdbePrestaging;
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        PackageCheck::new(
            &["MariaDB-client", "MariaDB-server"],
            ListingUrl::append("rpms/"),
            PackagePattern::Name,
        ),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::append_url(&["rpm"]),
            Step::split_rpm_platforms(),
            Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
            Step::append_url_with(&["x86_64", "aarch64"], Some(Field::Architecture), false),
            Step::finalize(RepoFormat::url().with_credentials(Some(rpm_auth))),
        ]),
    );

    let deb = CrawlPlan::new(
        product,
        deb_source,
        Some(deb_auth.clone()),
        PackageCheck::new(
            &["mariadb-client", "mariadb-server"],
            ListingUrl::pool(2, "pool/main/m/mariadb-{series}/", Series::MajorMinor { fallback: None }),
            PackagePattern::NameThenPlatformVersion,
        ),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::append_url_with(&["deb"], None, true),
            Step::append_url(&["dists"]),
            Step::extract_deb_platforms(),
            Step::finalize(RepoFormat::deb_suite("main").with_credentials(Some(deb_auth))),
        ]),
    );

    Ok(vec![rpm, deb])
}
