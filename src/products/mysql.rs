//! MySQL community repositories
//!
//! RPM trees look like `mysql-8.0-community/el/7/x86_64/`. Apt trees keep the
//! series as a component below the suite: `ubuntu/dists/focal/mysql-8.0/`.

use super::{CrawlPlan, Product, Steps};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::Mysql;

    let rpm = CrawlPlan::new(
        product,
        config.repository(product.name(), "rpm")?,
        None,
        PackageCheck::new(&["mysql"], ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(vec![
            Step::extract_field(Field::Version, r"^mysql-(\d+\.?\d+)-community/?$")?,
            Step::split_rpm_platforms(),
            Step::save_as_field(Field::PlatformVersion),
            Step::append_url(&["x86_64"]),
            Step::finalize(RepoFormat::url()),
        ]),
    );

    let deb = CrawlPlan::new(
        product,
        config.repository(product.name(), "deb")?,
        None,
        PackageCheck::new(
            &["mysql"],
            ListingUrl::pool(3, "pool/mysql-{series}/m/mysql-community/", Series::Version),
            PackagePattern::Name,
        ),
        Steps::Bounded(vec![
            Step::append_url_with(&["debian", "ubuntu"], Some(Field::Platform), true),
            Step::append_url(&["dists"]),
            Step::save_as_field(Field::PlatformVersion),
            Step::extract_field(Field::Version, r"^mysql-(\d+\.?\d+(-[^/]*)?)/?$")?,
            Step::finalize(RepoFormat::deb_component("mysql-")),
        ]),
    );

    Ok(vec![rpm, deb])
}
