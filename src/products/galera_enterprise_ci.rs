//! Galera Enterprise CI builds
//!
//! Every version directory holds a `yum/` tree and an `apt/` archive whose
//! pool is shared by all Galera 4 enterprise builds.

use super::{authenticated, CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::GaleraEnterpriseCi;
    let packages = ["galera-enterprise"];
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        PackageCheck::new(&packages, ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::append_url(&["yum"]),
            Step::split_rpm_platforms(),
            Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
            Step::finalize(RepoFormat::url().with_credentials(Some(rpm_auth))),
        ]),
    );

    let deb = CrawlPlan::new(
        product,
        deb_source,
        Some(deb_auth.clone()),
        PackageCheck::new(
            &packages,
            ListingUrl::pool(2, "pool/main/g/galera-enterprise-4/", Series::Version),
            PackagePattern::NameThenPlatformVersion,
        ),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::append_url_with(&["apt"], None, true),
            Step::append_url(&["dists"]),
            Step::extract_deb_platforms(),
            Step::finalize(RepoFormat::deb_suite("main").with_credentials(Some(deb_auth))),
        ]),
    );

    Ok(vec![rpm, deb])
}
