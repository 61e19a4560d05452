use super::{CrawlPlan, Product, Steps};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern, Series};
use crate::release::Field;
use crate::steps::{RepoFormat, Step};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::Columnstore;
    let packages = ["mariadb-columnstore"];

    let rpm = CrawlPlan::new(
        product,
        config.repository(product.name(), "rpm")?,
        None,
        PackageCheck::new(&packages, ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::append_url(&["yum"]),
            Step::split_rpm_platforms(),
            Step::save_as_field(Field::PlatformVersion),
            Step::append_url(&["x86_64"]),
            Step::finalize(RepoFormat::url()),
        ]),
    );

    // Platform directories carry the version: `repo/debian9/dists/stretch/`
    let deb = CrawlPlan::new(
        product,
        config.repository(product.name(), "deb")?,
        None,
        PackageCheck::new(
            &packages,
            ListingUrl::pool(2, "pool/main/m/", Series::Version),
            PackagePattern::Name,
        ),
        Steps::Bounded(vec![
            Step::save_as_field(Field::Version),
            Step::append_url(&["repo"]),
            Step::extract_field_with_path(Field::Platform, r"^(\p{Alpha}+)\p{Digit}+/?$")?,
            Step::append_url(&["dists"]),
            Step::save_as_field(Field::PlatformVersion),
            Step::finalize(RepoFormat::repo_url()),
        ]),
    );

    Ok(vec![rpm, deb])
}
