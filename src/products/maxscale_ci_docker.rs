//! MaxScale CI images in a Docker registry
//!
//! Not a directory crawl: the registry's tag list is the release list.

use super::{authenticated, DiscoveryContext, Product};
use crate::release::ReleaseRecord;
use crate::url::resolve_href;
use crate::{ConfigError, Result};
use serde::Deserialize;
use url::Url;

const IMAGE: &str = "mariadb/maxscale-ci";

#[derive(Debug, Deserialize)]
struct TagList {
    tags: Option<Vec<String>>,
}

/// Lists the image tags of the registry configured as `registry`
///
/// A registry that cannot be reached fails like an unreachable repository
/// root. An answer that is not a tag list is logged and yields no releases.
pub(super) async fn discover(ctx: &DiscoveryContext) -> Result<Vec<ReleaseRecord>> {
    let product = Product::MaxscaleCiDocker;
    let (source, credentials) = authenticated(&ctx.config, product, "registry")?;

    let tags_url = resolve_href(&source.path, &format!("/v2/{}/tags/list", IMAGE));
    let Some(image_path) = image_path(&source.path) else {
        return Err(ConfigError::InvalidUrl(source.path.clone()).into());
    };

    ctx.stats.record_fetch();
    let body = match ctx.source.fetch_page(&tags_url, Some(&credentials)).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to get tags for docker from {}: {}", tags_url, e);
            ctx.stats.record_fetch_failure();
            return Err(e.into());
        }
    };

    let tags = match serde_json::from_str::<TagList>(&body) {
        Ok(list) => list.tags.unwrap_or_default(),
        Err(e) => {
            tracing::error!("Failed to get tags for docker from {}: {}", tags_url, e);
            return Ok(Vec::new());
        }
    };

    let product_name = source
        .product_name
        .clone()
        .unwrap_or_else(|| Product::MaxscaleCi.name().to_string());
    let records: Vec<ReleaseRecord> = tags
        .into_iter()
        .filter(|tag| ctx.product_version.as_deref().map_or(true, |wanted| wanted == tag))
        .map(|tag| ReleaseRecord {
            repo: format!("{}:{}", image_path, tag),
            repo_key: String::new(),
            platform: "docker".to_string(),
            platform_version: "latest".to_string(),
            product: product_name.clone(),
            version: tag,
            architecture: None,
        })
        .collect();

    tracing::info!("{}: {} images discovered", product, records.len());
    Ok(records)
}

/// `host:port/mariadb/maxscale-ci`
fn image_path(registry: &str) -> Option<String> {
    let url = Url::parse(registry).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}/{}", host, port, IMAGE))
}
