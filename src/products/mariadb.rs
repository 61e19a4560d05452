//! MariaDB community server archive
//!
//! RPM: `<version>/<platform>/<platform_version>/<arch>/`, packages under `rpms/`.
//! Deb: `<version>/<platform>/dists/<codename>/`, packages in the version pool.

use super::{CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR, VERSION_DIR};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::Mariadb;

    let rpm = CrawlPlan::new(
        product,
        config.repository(product.name(), "rpm")?,
        None,
        PackageCheck::new(
            &["MariaDB-client", "MariaDB-server"],
            ListingUrl::append("rpms/"),
            PackagePattern::Name,
        ),
        Steps::Bounded(vec![
            Step::extract_field(Field::Version, VERSION_DIR)?,
            Step::append_url_with(&["centos", "rhel", "sles", "opensuse"], Some(Field::Platform), false),
            Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
            Step::append_url_with(&["x86_64", "aarch64"], Some(Field::Architecture), false),
            Step::finalize(RepoFormat::url()),
        ]),
    );

    let deb = CrawlPlan::new(
        product,
        config.repository(product.name(), "deb")?,
        None,
        PackageCheck::new(
            &["mariadb-client", "mariadb-server"],
            ListingUrl::pool(2, "pool/main/m/mariadb-{series}/", Series::MajorMinor { fallback: None }),
            PackagePattern::NameThenPlatformVersion,
        ),
        Steps::Bounded(vec![
            Step::extract_field(Field::Version, VERSION_DIR)?,
            Step::save_as_field_with_path(Field::Platform),
            Step::append_url(&["dists"]),
            Step::save_as_field(Field::PlatformVersion),
            Step::finalize(RepoFormat::deb_suite("main")),
        ]),
    );

    Ok(vec![rpm, deb])
}
