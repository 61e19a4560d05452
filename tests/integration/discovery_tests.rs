use crate::common::{config, context, http_source, mount_listing, CI_AUTH};
use repo_discovery::crawler::{
    KeySource, ListingUrl, PackageCheck, PackagePattern, Pipeline, RepositorySpec,
};
use repo_discovery::release::Field;
use repo_discovery::{discover, discover_with_retries, DiscoveryError, Product, ReleaseRecord, Step};
use std::collections::BTreeSet;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Public MaxScale tree: `6.1` has a complete el8 build, an empty sles15
/// directory and an Ubuntu focal archive
async fn mount_maxscale(server: &MockServer, versions: &[&str]) {
    mount_listing(server, "/maxscale/", versions, None).await;
    mount_listing(server, "/maxscale/6.1/", &["el/", "sles/"], None).await;
    mount_listing(server, "/maxscale/6.1/el/", &["8/"], None).await;
    mount_listing(server, "/maxscale/6.1/el/8/", &["x86_64/"], None).await;
    mount_listing(
        server,
        "/maxscale/6.1/el/8/x86_64/",
        &["maxscale-6.1.4-1.rhel.8.x86_64.rpm"],
        None,
    )
    .await;
    mount_listing(server, "/maxscale/6.1/sles/", &["15/"], None).await;
    mount_listing(server, "/maxscale/6.1/sles/15/", &["x86_64/"], None).await;
    mount_listing(server, "/maxscale/6.1/sles/15/x86_64/", &["README"], None).await;

    mount_listing(server, "/maxscale-deb/", &["6.1/"], None).await;
    mount_listing(server, "/maxscale-deb/6.1/", &["ubuntu/"], None).await;
    mount_listing(server, "/maxscale-deb/6.1/ubuntu/", &["dists/", "pool/"], None).await;
    mount_listing(server, "/maxscale-deb/6.1/ubuntu/dists/", &["focal/"], None).await;
    mount_listing(server, "/maxscale-deb/6.1/ubuntu/dists/focal/", &["main/"], None).await;
    mount_listing(
        server,
        "/maxscale-deb/6.1/ubuntu/dists/focal/main/binary-amd64/",
        &["maxscale_6.1.4~focal-1_amd64.deb"],
        None,
    )
    .await;
}

fn maxscale_config(uri: &str) -> String {
    format!(
        r#"
        [products.maxscale.rpm]
        path = "{uri}/maxscale/"
        key = "{uri}/MariaDB-MaxScale-GPG-KEY"

        [products.maxscale.deb]
        path = "{uri}/maxscale-deb/"
        key = "{uri}/MariaDB-MaxScale-GPG-KEY"
        "#
    )
}

/// Records with the server address removed, for comparing runs
fn portable(records: &[ReleaseRecord], uri: &str) -> BTreeSet<(String, String, String, String, String)> {
    records
        .iter()
        .map(|r| {
            (
                r.repo.replace(uri, ""),
                r.repo_key.replace(uri, ""),
                r.platform.clone(),
                r.platform_version.clone(),
                r.version.clone(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_scenario_version_then_platforms() {
    let mock_server = MockServer::start().await;
    mount_listing(&mock_server, "/product/", &["10.5/"], None).await;
    mount_listing(&mock_server, "/product/10.5/", &["rhel/", "debian/"], None).await;
    mount_listing(&mock_server, "/product/10.5/rhel/", &["server.rpm"], None).await;
    mount_listing(&mock_server, "/product/10.5/debian/", &["server.deb"], None).await;

    let base_url = format!("{}/product/", mock_server.uri());
    let repository = RepositorySpec {
        base_url: base_url.clone(),
        key: Some("KEY".to_string()),
        key_source: KeySource::Configured,
        product: "product".to_string(),
        check: PackageCheck::new(&["server"], ListingUrl::Current, PackagePattern::Name),
    };
    let steps = vec![
        Step::save_as_field(Field::Version),
        Step::append_url_with(&["rhel", "debian"], Some(Field::Platform), false),
    ];

    let pipeline = Pipeline::new(Arc::new(http_source()), 4);
    let releases = pipeline
        .parse_repository(&repository, &steps)
        .await
        .expect("Seed listing is served");

    let found: BTreeSet<(String, String, String)> = releases
        .iter()
        .map(|r| {
            (
                r.url.clone(),
                r.version.clone().unwrap_or_default(),
                r.platform.clone().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        found,
        BTreeSet::from([
            (format!("{}10.5/debian/", base_url), "10.5".to_string(), "debian".to_string()),
            (format!("{}10.5/rhel/", base_url), "10.5".to_string(), "rhel".to_string()),
        ])
    );
}

#[tokio::test]
async fn test_maxscale_discovery() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    mount_maxscale(&mock_server, &["6.1/"]).await;

    let ctx = context(config(&maxscale_config(&uri)));
    let records = discover(Product::Maxscale, &ctx).await.expect("Discovery should succeed");

    let key = format!("{}/MariaDB-MaxScale-GPG-KEY", uri);
    let rpm_repo = format!("{}/maxscale/6.1/el/8/x86_64/", uri);
    let deb_repo = format!("{}/maxscale-deb/6.1/ubuntu focal main", uri);

    let mut platforms: Vec<(&str, &str, &str)> = records
        .iter()
        .map(|r| (r.platform.as_str(), r.platform_version.as_str(), r.repo.as_str()))
        .collect();
    platforms.sort();
    assert_eq!(
        platforms,
        vec![
            ("centos", "8", rpm_repo.as_str()),
            ("rhel", "8", rpm_repo.as_str()),
            ("ubuntu", "focal", deb_repo.as_str()),
        ]
    );
    assert!(records.iter().all(|r| r.product == "maxscale"));
    assert!(records.iter().all(|r| r.version == "6.1"));
    assert!(records.iter().all(|r| r.repo_key == key));

    // The sles tree resolved but failed package verification
    assert_eq!(ctx.stats.snapshot().corrupted, 1);
}

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    mount_maxscale(&mock_server, &["6.1/"]).await;

    let ctx = context(config(&maxscale_config(&uri)));
    let first = discover(Product::Maxscale, &ctx).await.expect("First run");
    let second = discover(Product::Maxscale, &ctx).await.expect("Second run");

    assert!(!first.is_empty());
    assert_eq!(portable(&first, &uri), portable(&second, &uri));
}

#[tokio::test]
async fn test_failed_sibling_does_not_affect_others() {
    let healthy_server = MockServer::start().await;
    let healthy_uri = healthy_server.uri();
    mount_maxscale(&healthy_server, &["6.1/"]).await;
    let baseline = discover(Product::Maxscale, &context(config(&maxscale_config(&healthy_uri))))
        .await
        .expect("Baseline run");

    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/maxscale/2.5/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_maxscale(&mock_server, &["2.5/", "6.1/"]).await;

    let ctx = context(config(&maxscale_config(&uri)));
    let records = discover(Product::Maxscale, &ctx).await.expect("Run with failing sibling");

    assert_eq!(portable(&records, &uri), portable(&baseline, &healthy_uri));
    assert_eq!(ctx.stats.snapshot().fetch_failures, 1);
}

#[tokio::test]
async fn test_unreachable_root_is_retried() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/maxscale/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_maxscale(&mock_server, &["6.1/"]).await;

    let ctx = context(config(&maxscale_config(&uri)));
    let (result, used) = discover_with_retries(Product::Maxscale, &ctx, 2).await;

    let records = result.expect("Second attempt should succeed");
    assert_eq!(used, 2);
    assert_eq!(records.len(), 3);
    assert_eq!(ctx.stats.snapshot().fetch_failures, 1);
}

#[tokio::test]
async fn test_unreachable_root_fails_after_last_attempt() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/maxscale/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let ctx = context(config(&maxscale_config(&uri)));
    let (result, used) = discover_with_retries(Product::Maxscale, &ctx, 2).await;

    assert!(matches!(result, Err(DiscoveryError::Fetch(_))));
    assert_eq!(used, 2);
}

#[tokio::test]
async fn test_product_version_filter() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    mount_maxscale(&mock_server, &["6.1/"]).await;

    let ctx = context(config(&maxscale_config(&uri))).with_product_version(Some("2.5".to_string()));
    let records = discover(Product::Maxscale, &ctx).await.expect("Discovery should succeed");

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_authenticated_ci_repository() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    let auth = Some(CI_AUTH);

    mount_listing(&mock_server, "/mariadb-ci/", &["10.6.1/"], auth).await;
    mount_listing(
        &mock_server,
        "/mariadb-ci/10.6.1/",
        &["rhel/", "apt/", "MariaDB-10.6-build-GPG-KEY.public"],
        auth,
    )
    .await;
    mount_listing(&mock_server, "/mariadb-ci/10.6.1/rhel/", &["8/"], auth).await;
    mount_listing(&mock_server, "/mariadb-ci/10.6.1/rhel/8/", &["x86_64/"], auth).await;
    mount_listing(
        &mock_server,
        "/mariadb-ci/10.6.1/rhel/8/x86_64/",
        &[
            "MariaDB-client-10.6.1-1.el8.x86_64.rpm",
            "MariaDB-server-10.6.1-1.el8.x86_64.rpm",
        ],
        auth,
    )
    .await;
    mount_listing(&mock_server, "/mariadb-ci/10.6.1/apt/", &["dists/", "pool/"], auth).await;
    mount_listing(&mock_server, "/mariadb-ci/10.6.1/apt/dists/", &["jammy/"], auth).await;
    mount_listing(&mock_server, "/mariadb-ci/10.6.1/apt/dists/jammy/", &["main/"], auth).await;
    mount_listing(&mock_server, "/mariadb-ci/10.6.1/apt/pool/main/m/", &["mariadb-10.6/"], auth).await;
    mount_listing(
        &mock_server,
        "/mariadb-ci/10.6.1/apt/pool/main/m/mariadb-10.6/",
        &[
            "mariadb-client-10.6_10.6.1+maria~ubu2204_amd64.deb",
            "mariadb-server-10.6_10.6.1+maria~ubu2204_amd64.deb",
        ],
        auth,
    )
    .await;

    let ctx = context(config(&format!(
        r#"
        [credentials.ci]
        username = "ci"
        password = "secret"

        [products.mariadb_ci.rpm]
        path = "{uri}/mariadb-ci/"
        key = "{uri}/mariadb-ci/RPM-GPG-KEY"
        credentials = "ci"

        [products.mariadb_ci.deb]
        path = "{uri}/mariadb-ci/"
        key = "{uri}/mariadb-ci/RPM-GPG-KEY"
        credentials = "ci"
        "#
    )));
    let records = discover(Product::MariadbCi, &ctx).await.expect("Discovery should succeed");

    let authed = uri.replacen("http://", "http://ci:secret@", 1);
    let repos: BTreeSet<String> = records.iter().map(|r| r.repo.clone()).collect();
    assert_eq!(
        repos,
        BTreeSet::from([
            format!("{}/mariadb-ci/10.6.1/apt jammy main", authed),
            format!("{}/mariadb-ci/10.6.1/rhel/8/x86_64/", authed),
        ])
    );
    // The build publishes its own key, which wins over the configured one
    assert!(records.iter().all(|r| r.repo_key
        == format!("{}/mariadb-ci/10.6.1/MariaDB-10.6-build-GPG-KEY.public", authed)));

    let rpm = records.iter().find(|r| r.platform == "rhel").expect("rhel release");
    assert_eq!(rpm.architecture.as_deref(), Some("x86_64"));
}

#[tokio::test]
async fn test_docker_registry_tags() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/v2/mariadb/maxscale-ci/tags/list"))
        .and(header("authorization", CI_AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"name": "mariadb/maxscale-ci", "tags": ["6.1.4", "latest"]}"#,
        ))
        .mount(&mock_server)
        .await;

    let ctx = context(config(&format!(
        r#"
        [credentials.docker]
        username = "ci"
        password = "secret"

        [products.maxscale_ci_docker.registry]
        path = "{uri}/"
        credentials = "docker"
        "#
    )));
    let records = discover(Product::MaxscaleCiDocker, &ctx)
        .await
        .expect("Discovery should succeed");

    let host = uri.trim_start_matches("http://");
    let repos: Vec<String> = records.iter().map(|r| r.repo.clone()).collect();
    assert_eq!(
        repos,
        vec![
            format!("{}/mariadb/maxscale-ci:6.1.4", host),
            format!("{}/mariadb/maxscale-ci:latest", host),
        ]
    );
    assert!(records.iter().all(|r| r.platform == "docker" && r.platform_version == "latest"));
    assert!(records.iter().all(|r| r.product == "maxscale_ci" && r.repo_key.is_empty()));
}

#[tokio::test]
async fn test_missing_credentials_is_configuration_error() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();

    let ctx = context(config(&format!(
        r#"
        [products.galera_ci.rpm]
        path = "{uri}/galera/"
        [products.galera_ci.deb]
        path = "{uri}/galera/"
        "#
    )));
    let result = discover(Product::GaleraCi, &ctx).await;

    assert!(matches!(
        result,
        Err(repo_discovery::DiscoveryError::Config(
            repo_discovery::ConfigError::MissingCredentials { .. }
        ))
    ));
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
