use crate::common::{http_source, http_source_with_timeout, mount_listing, CI_AUTH};
use repo_discovery::config::Credentials;
use repo_discovery::crawler::{
    KeySource, ListingUrl, PackageCheck, PackagePattern, Pipeline, RepositorySpec,
};
use repo_discovery::release::Field;
use repo_discovery::{FetchError, LinkSource, Step};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_directory_links_from_listing() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, "/mariadb/", &["10.5/", "10.6/", "README.txt"], None).await;

    let source = http_source();
    let links = source
        .directory_links(&format!("{}/mariadb/", mock_server.uri()), None)
        .await
        .expect("Listing should be fetched");

    let names: Vec<String> = links.iter().map(|link| link.name()).collect();
    assert_eq!(names, vec!["10.5", "10.6"]);
}

#[tokio::test]
async fn test_duplicate_slashes_are_collapsed() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, "/mariadb/10.5/", &["rhel/"], None).await;

    let source = http_source();
    let links = source
        .directory_links(&format!("{}//mariadb///10.5/", mock_server.uri()), None)
        .await
        .expect("Normalized URL should be served");

    assert_eq!(links.len(), 1);
}

#[tokio::test]
async fn test_basic_auth_is_sent() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, "/private/", &["6.1/"], Some(CI_AUTH)).await;

    let source = http_source();
    let url = format!("{}/private/", mock_server.uri());

    let anonymous = source.directory_links(&url, None).await;
    assert!(matches!(anonymous, Err(FetchError::Status { status: 404, .. })));

    let credentials = Credentials::new("ci", "secret");
    let links = source
        .directory_links(&url, Some(&credentials))
        .await
        .expect("Authenticated request should succeed");
    assert_eq!(links[0].name(), "6.1");
}

#[tokio::test]
async fn test_server_error_is_status_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let source = http_source();
    let result = source
        .fetch_links(&format!("{}/broken/", mock_server.uri()), None)
        .await;

    match result {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.ends_with("/broken/"));
        }
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_html_yields_no_links() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/garbage/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<<<<<not a listing"))
        .mount(&mock_server)
        .await;

    let source = http_source();
    let links = source
        .fetch_links(&format!("{}/garbage/", mock_server.uri()), None)
        .await
        .expect("Malformed HTML is not an error");
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_anchor_markup() {
    let mock_server = MockServer::start().await;
    mount_listing(
        &mock_server,
        "/rpms/",
        &["MariaDB-server-10.5.8-1.el8.x86_64.rpm"],
        None,
    )
    .await;

    let source = http_source();
    let markup = source
        .anchor_markup(&format!("{}/rpms/", mock_server.uri()), None)
        .await;
    assert!(markup.contains("MariaDB-server-10.5.8-1.el8.x86_64.rpm"));
    assert!(!markup.contains("<pre>"));

    let missing = source
        .anchor_markup(&format!("{}/missing/", mock_server.uri()), None)
        .await;
    assert_eq!(missing, "");
}

async fn mount_slow_listing(server: &MockServer, url_path: &str, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(url_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(crate::common::listing(&["rhel/"]))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_slow_listing_times_out() {
    let mock_server = MockServer::start().await;
    mount_slow_listing(&mock_server, "/slow/", Duration::from_secs(3)).await;

    let source = http_source_with_timeout(1);
    let result = source
        .fetch_links(&format!("{}/slow/", mock_server.uri()), None)
        .await;

    match result {
        Err(FetchError::Timeout { url }) => assert!(url.ends_with("/slow/")),
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timed_out_sibling_does_not_affect_others() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, "/tree/", &["slow/", "fast/"], None).await;
    mount_slow_listing(&mock_server, "/tree/slow/", Duration::from_secs(3)).await;
    mount_listing(&mock_server, "/tree/fast/", &["rhel/"], None).await;
    mount_listing(&mock_server, "/tree/fast/rhel/", &["server.rpm"], None).await;

    let base_url = format!("{}/tree/", mock_server.uri());
    let repository = RepositorySpec {
        base_url: base_url.clone(),
        key: None,
        key_source: KeySource::Configured,
        product: "product".to_string(),
        check: PackageCheck::new(&["server"], ListingUrl::Current, PackagePattern::Name),
    };
    let steps = vec![
        Step::save_as_field(Field::Version),
        Step::append_url_with(&["rhel"], Some(Field::Platform), false),
    ];

    let pipeline = Pipeline::new(Arc::new(http_source_with_timeout(1)), 4);
    let releases = pipeline
        .parse_repository(&repository, &steps)
        .await
        .expect("Seed listing is served");

    let urls: Vec<&str> = releases.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec![format!("{}fast/rhel/", base_url).as_str()]);
    assert_eq!(pipeline.stats().snapshot().fetch_failures, 1);
}

#[tokio::test]
async fn test_redirect_loop_is_transport_error() {
    let mock_server = MockServer::start().await;
    let url = format!("{}/loop/", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/loop/"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", url.as_str()))
        .mount(&mock_server)
        .await;

    let source = http_source();
    let result = source.fetch_links(&url, None).await;

    assert!(
        matches!(result, Err(FetchError::Transport { .. })),
        "Expected transport error, got {:?}",
        result
    );
}
