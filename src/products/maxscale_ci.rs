//! MaxScale CI builds, same layout as the public MaxScale repository but
//! behind HTTP Basic authentication

use super::{authenticated, maxscale, CrawlPlan, Product, Steps};
use crate::config::Config;
use crate::crawler::{ListingUrl, PackageCheck, PackagePattern};
use crate::ConfigResult;

pub(super) fn plans(config: &Config) -> ConfigResult<Vec<CrawlPlan>> {
    let product = Product::MaxscaleCi;
    let (rpm_source, rpm_auth) = authenticated(config, product, "rpm")?;
    let (deb_source, deb_auth) = authenticated(config, product, "deb")?;

    let rpm = CrawlPlan::new(
        product,
        rpm_source,
        Some(rpm_auth.clone()),
        PackageCheck::new(&["maxscale"], ListingUrl::Current, PackagePattern::Name),
        Steps::Bounded(maxscale::rpm_steps(Some(rpm_auth))?),
    );

    let deb = CrawlPlan::new(
        product,
        deb_source,
        Some(deb_auth.clone()),
        PackageCheck::new(
            &["maxscale"],
            ListingUrl::append("main/binary-amd64/"),
            PackagePattern::Name,
        ),
        Steps::Bounded(maxscale::deb_steps(Some(deb_auth))),
    );

    Ok(vec![rpm, deb])
}
