use super::{authenticated, mariadb_ci, CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::GaleraCi;
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        PackageCheck::new(&["galera"], ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
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
            &["galera"],
            ListingUrl::first_pool_subdirectory(2, "pool/main/g/"),
            PackagePattern::NameThenPlatformVersion,
        ),
        Steps::Bounded(mariadb_ci::apt_steps(Some(deb_auth))),
    );

    Ok(vec![rpm, deb])
}
