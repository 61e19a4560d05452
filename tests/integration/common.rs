use repo_discovery::config::{parse_config, Config, CrawlerConfig, UserAgentConfig};
use repo_discovery::{DiscoveryContext, HttpLinkSource};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `Authorization` header for `ci:secret`
pub const CI_AUTH: &str = "Basic Y2k6c2VjcmV0";

/// Renders an autoindex-style page; entries ending in `/` are directories
pub fn listing(entries: &[&str]) -> String {
    let anchors: String = std::iter::once("../")
        .chain(entries.iter().copied())
        .map(|entry| format!("<a href=\"{0}\">{0}</a>\n", entry))
        .collect();
    format!(
        "<html><head><title>Index</title></head><body><pre>\n{}</pre></body></html>",
        anchors
    )
}

/// Serves a listing at `url_path`, optionally only to authenticated requests
pub async fn mount_listing(server: &MockServer, url_path: &str, entries: &[&str], auth: Option<&str>) {
    let mock = Mock::given(method("GET")).and(path(url_path));
    let mock = match auth {
        Some(value) => mock.and(header("authorization", value)),
        None => mock,
    };
    mock.respond_with(
        ResponseTemplate::new(200)
            .set_body_string(listing(entries))
            .insert_header("content-type", "text/html"),
    )
    .mount(server)
    .await;
}

pub fn http_source() -> HttpLinkSource {
    http_source_with_timeout(5)
}

pub fn http_source_with_timeout(request_timeout_secs: u64) -> HttpLinkSource {
    let crawler = CrawlerConfig {
        request_timeout_secs,
        connect_timeout_secs: 2,
        ..CrawlerConfig::default()
    };
    let user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
    };
    HttpLinkSource::from_config(&crawler, &user_agent).expect("Failed to build client")
}

pub fn config(toml: &str) -> Config {
    parse_config(toml).expect("Failed to parse test configuration")
}

pub fn context(config: Config) -> DiscoveryContext {
    DiscoveryContext::new(Arc::new(config), Arc::new(http_source()))
}
