use super::{CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::{Config, Credentials};
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::Maxscale;

    let rpm = CrawlPlan::new(
        product,
        config.repository(product.name(), "rpm")?,
        None,
        PackageCheck::new(&["maxscale"], ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(rpm_steps(None)?),
    );

    let deb = CrawlPlan::new(
        product,
        config.repository(product.name(), "deb")?,
        None,
        PackageCheck::new(
            &["maxscale"],
            ListingUrl::append("main/binary-amd64/"),
            PackagePattern::Name,
        ),
        Steps::Bounded(deb_steps(None)),
    );

    Ok(vec![rpm, deb])
}

/// `<version>/<el|sles|...>/<platform_version>/x86_64/`
pub(super) fn rpm_steps(credentials: Option<Credentials>) -> ConfigResult<Vec<Step>> {
    Ok(vec![
        Step::save_as_field(Field::Version),
        Step::split_rpm_platforms(),
        Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
        Step::append_url(&["x86_64"]),
        Step::finalize(RepoFormat::url().with_credentials(credentials)),
    ])
}

/// `<version>/<debian|ubuntu>/dists/<codename>/`
pub(super) fn deb_steps(credentials: Option<Credentials>) -> Vec<Step> {
    vec![
        Step::save_as_field(Field::Version),
        Step::append_url_with(&["debian", "ubuntu"], Some(Field::Platform), true),
        Step::append_url(&["dists"]),
        Step::save_as_field(Field::PlatformVersion),
        Step::finalize(RepoFormat::deb_suite("main").with_credentials(credentials)),
    ]
}
