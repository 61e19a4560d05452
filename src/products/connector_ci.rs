//! Connector CI builds (C, C++ and ODBC connectors)
//!
//! RPM: `<version>/<platform>/<platform_version>/`, with an `x86_64/`
//! subdirectory on newer builds only.
//! Deb: `<version>/apt/dists/<codename>/`, packages in the connector's pool.

use super::{authenticated, CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

/// Package names a connector build must contain
struct Packages {
    rpm: &'static str,
    deb: &'static str,
}

fn packages(product: Product) -> Packages {
    match product {
        Product::ConnectorCppCi => Packages {
            rpm: "mariadb-connector-cpp",
            deb: "libmariadbcpp",
        },
        Product::ConnectorOdbcCi => Packages {
            rpm: "mariadb-connector-odbc",
            deb: "mariadb-connector-odbc",
        },
        _ => Packages {
            rpm: "MariaDB-connector-c",
            deb: "libmariadb3",
        },
    }
}

pub(super) fn plans(config: &Config, product: Product) -> ConfigResult<Vec<CrawlPlan>> {
    let packages = packages(product);
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        PackageCheck::new(&[packages.rpm], ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::split_rpm_platforms(),
            Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
            Step::append_path_if_exists("x86_64"),
            Step::finalize(RepoFormat::url().with_credentials(Some(rpm_auth))),
        ]),
    );

    let deb = CrawlPlan::new(
        product,
        deb_source,
        Some(deb_auth.clone()),
        PackageCheck::new(
            &[packages.deb],
            ListingUrl::pool(2, &format!("pool/main/m/{}/", packages.deb), Series::Version),
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
