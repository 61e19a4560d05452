//! MariaDB staging repository
//!
//! Release directories are named `mariadb-<version>`; the prefix is not part
//! of the version. RPM builds live under `yum/`, Debian and Ubuntu archives
//! under `repo/<platform>/`.

use super::{CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

/// `mariadb-10.5.8/` or a bare `10.5.8/`
const STAGING_VERSION_DIR: &str = r"^(?:mariadb-)?(\d[\w.\-]*)/?$";

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::MariadbStaging;
    let rpm_source = config.repository(product.name(), "rpm")?;
    let deb_source = config.repository(product.name(), "deb")?;
    let rpm_auth = config.credentials_for(product.name(), rpm_source)?;
    let deb_auth = config.credentials_for(product.name(), deb_source)?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        rpm_auth.clone(),
        PackageCheck::new(
            &["MariaDB-client", "MariaDB-server"],
            ListingUrl::append("rpms/"),
            PackagePattern::Name,
        ),
        Steps::Bounded(vec![
            Step::extract_field(Field::Version, STAGING_VERSION_DIR)?,
            Step::append_url(&["yum"]),
            Step::split_rpm_platforms(),
            Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
            Step::append_url(&["x86_64"]),
            Step::finalize(RepoFormat::url().with_credentials(rpm_auth)),
        ]),
    );

    let deb = CrawlPlan::new(
        product,
        deb_source,
        deb_auth.clone(),
        PackageCheck::new(
            &["mariadb-client", "mariadb-server"],
            ListingUrl::pool(2, "pool/main/m/mariadb-{series}/", Series::MajorMinor { fallback: None }),
            PackagePattern::NameThenPlatformVersion,
        ),
        Steps::Bounded(vec![
            Step::extract_field(Field::Version, STAGING_VERSION_DIR)?,
            Step::append_url(&["repo"]),
            Step::append_url_with(&["debian", "ubuntu"], Some(Field::Platform), true),
            Step::append_url(&["dists"]),
            Step::save_as_field(Field::PlatformVersion),
            Step::finalize(RepoFormat::deb_suite("main").with_credentials(deb_auth)),
        ]),
    );

    Ok(vec![rpm, deb])
}
