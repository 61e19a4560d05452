//! MariaDB Enterprise CI builds
//!
//! Two kinds of trees are published. The CI repository has one directory per
//! build (`<version>/yum/...`, `<version>/apt/...`). The enterprise staging
//! repository nests builds at varying depth (`10.5/10.5.8-5/yum/...`); it is
//! crawled recursively until the package format directories appear, and the
//! traversed directory names form the version.

use super::{authenticated, CrawlPlan, Product, Steps, PLATFORM_VERSION_DIR};
use crate::config::{Config, Credentials};
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{Completion, PipelineStep, RepoFormat, Step};
use crate::ConfigResult;

/// Directories found in a finished build
const BUILD_FORMATS: [&str; 4] = ["apt", "yum", "bintar", "sourcetar"];

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::MdbeCi;
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;
    let (es_rpm_source, es_rpm_auth) = authenticated(config, product, "es-rpm")?;
    let (es_deb_source, es_deb_auth) = authenticated(config, product, "es-deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        rpm_check(),
        Steps::Bounded(
            std::iter::once(Step::save_as_field(Field::Version))
                .chain(yum_steps(RepoFormat::url().with_credentials(Some(rpm_auth)))?)
                .collect(),
        ),
    );

    let deb = CrawlPlan::new(
        product,
        deb_source,
        Some(deb_auth.clone()),
        deb_check(),
        Steps::Bounded(
            std::iter::once(Step::save_as_field(Field::Version))
                .chain(apt_steps(Some(deb_auth), false))
                .collect(),
        ),
    );

    let es_rpm = CrawlPlan::new(
        product,
        es_rpm_source,
        Some(es_rpm_auth.clone()),
        rpm_check(),
        Steps::Recursive(
            std::iter::once(until_build_formats())
                .chain(
                    yum_steps(
                        RepoFormat::url()
                            .with_credentials(Some(es_rpm_auth))
                            .joining_version_path(),
                    )?
                    .into_iter()
                    .map(PipelineStep::from),
                )
                .collect(),
        ),
    );

    let es_deb = CrawlPlan::new(
        product,
        es_deb_source,
        Some(es_deb_auth.clone()),
        deb_check(),
        Steps::Recursive(
            std::iter::once(until_build_formats())
                .chain(apt_steps(Some(es_deb_auth), true).into_iter().map(PipelineStep::from))
                .collect(),
        ),
    );

    Ok(vec![rpm, deb, es_rpm, es_deb])
}

fn rpm_check() -> PackageCheck {
    PackageCheck::new(
        &["MariaDB-client", "MariaDB-server"],
        ListingUrl::Current,
        PackagePattern::Name,
    )
}

fn deb_check() -> PackageCheck {
    PackageCheck::new(
        &["mariadb-client", "mariadb-server"],
        ListingUrl::pool(
            2,
            "pool/main/m/mariadb-{series}/",
            Series::MajorMinor {
                fallback: Some("10.2".to_string()),
            },
        ),
        PackagePattern::NameThenPlatformVersion,
    )
}

fn until_build_formats() -> PipelineStep {
    PipelineStep::until(Step::AppendToField, Completion::any_dir(&BUILD_FORMATS))
}

fn yum_steps(format: RepoFormat) -> ConfigResult<Vec<Step>> {
    Ok(vec![
        Step::append_url(&["yum"]),
        Step::split_rpm_platforms(),
        Step::extract_field(Field::PlatformVersion, PLATFORM_VERSION_DIR)?,
        Step::finalize(format),
    ])
}

fn apt_steps(credentials: Option<Credentials>, join_version_path: bool) -> Vec<Step> {
    let mut format = RepoFormat::deb_suite("main").with_credentials(credentials);
    if join_version_path {
        format = format.joining_version_path();
    }
    vec![
        Step::append_url_with(&["apt"], None, true),
        Step::append_url(&["dists"]),
        Step::extract_deb_platforms(),
        Step::finalize(format),
    ]
}
