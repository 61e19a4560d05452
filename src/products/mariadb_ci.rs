//! MariaDB server CI builds
//!
//! Every build directory holds `yum/` style platform trees and an `apt/`
//! archive. The pool of the apt archive contains a single source package
//! directory whose name changes with the server series. A build may
//! publish its own `*.public` signing key next to those trees.

use super::{authenticated, CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::{Config, Credentials};
use crate::crawler::{KeySource, ListingUrl, PackageCheck, PackagePattern};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::MariadbCi;
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        PackageCheck::new(
            &["MariaDB-client", "MariaDB-server"],
            ListingUrl::Current,
            PackagePattern::Name,
        ),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::split_rpm_platforms(),
            Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
            Step::append_url_with(&["x86_64", "aarch64"], Some(Field::Architecture), false),
            Step::finalize(RepoFormat::url().with_credentials(Some(rpm_auth))),
        ]),
    )
    // <version>/<platform>/<platform_version>/<arch>/
    .with_key_source(KeySource::BuildDirectory { levels_up: 4 });

    let deb = CrawlPlan::new(
        product,
        deb_source,
        Some(deb_auth.clone()),
        PackageCheck::new(
            &["mariadb-client", "mariadb-server"],
            ListingUrl::first_pool_subdirectory(2, "pool/main/m/"),
            PackagePattern::Name,
        ),
        Steps::Bounded(apt_steps(Some(deb_auth))),
    )
    // <version>/apt/dists/<codename>/
    .with_key_source(KeySource::BuildDirectory { levels_up: 3 });

    Ok(vec![rpm, deb])
}

/// `<version>/apt/dists/<codename>/`, shared by the CI products
pub(super) fn apt_steps(credentials: Option<Credentials>) -> Vec<Step> {
    vec![
        Step::save_as_field(Field::Version),
        Step::append_url_with(&["apt"], None, true),
        Step::append_url(&["dists"]),
        Step::extract_deb_platforms(),
        Step::finalize(RepoFormat::deb_suite("main").with_credentials(credentials)),
    ]
}
