//! Integration tests for complete check runs
//!
//! These tests use wiremock to serve a small documentation portal and run the
//! crawl and validation phases end-to-end over real HTTP.

use anchor_watch::config::{load_config, Config, DenylistConfig, ExtractorKind, RunSettings};
use anchor_watch::crawler::{
    build_http_client, Coordinator, HttpLinkProbe, HttpPageFetcher, RunOutcome, RunReport,
};
use anchor_watch::{CheckError, IssueKind, Severity};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates settings checking the whole mock server
fn create_test_settings(base_url: &str, configure: impl FnOnce(&mut Config)) -> RunSettings {
    let mut config = Config::default();
    config.target.domain = base_url.to_string();
    // The default denylist skips loopback hosts, which is where the mock lives
    config.denylist = DenylistConfig::empty();
    config.network.probe_timeout = 5;
    config.network.page_timeout = 5;
    config.network.sitemap_timeout = 5;
    configure(&mut config);
    RunSettings::from_config(&config).expect("valid test settings")
}

/// Runs a complete check without printing the issue log
async fn run_check(settings: RunSettings) -> RunReport {
    let client = build_http_client(&settings.network).expect("Failed to build client");
    let fetcher = HttpPageFetcher::new(client.clone(), settings.page_timeout());
    let probe = HttpLinkProbe::new(client, settings.probe_timeout(), settings.sitemap_timeout());

    let mut coordinator = Coordinator::silent(settings, fetcher, probe);
    let outcome = coordinator.execute().await;
    coordinator.finish(outcome)
}

async fn mount_sitemap(server: &MockServer, paths: &[&str]) {
    let entries: String = paths
        .iter()
        .map(|p| format!("  <url><loc>{}{}</loc></url>\n", server.uri(), p))
        .collect();
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>",
        entries
    );

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    "<html><head><title>{}</title></head><body>{}</body></html>",
                    title, body
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_in_page_anchor_ok() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/a"]).await;
    mount_page(
        &mock_server,
        "/a",
        "Page A",
        r##"<h2 id="sec1">Section</h2><a href="#sec1">Jump</a>"##,
    )
    .await;

    let report = run_check(create_test_settings(&mock_server.uri(), |_| {})).await;

    assert!(report.outcome.is_completed());
    assert_eq!(report.counters.ok_in_page, 1);
    assert_eq!(report.counters.pages_indexed, 1);
    assert_eq!(report.counters.pages_checked, 1);
    assert!(report.issues.is_empty());
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn test_internal_anchor_missing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_sitemap(&mock_server, &["/a", "/b"]).await;
    mount_page(
        &mock_server,
        "/a",
        "Page A",
        &format!(r##"<a href="{}/b#missing">B</a>"##, base_url),
    )
    .await;
    mount_page(&mock_server, "/b", "Page B", r#"<p id="present">B</p>"#).await;

    let report = run_check(create_test_settings(&base_url, |_| {})).await;

    assert_eq!(report.counters.nok_internal, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::InternalAnchorMissing);
    assert_eq!(report.issues[0].page.as_ref().unwrap().title, "Page A");
    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_normal_link_404() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_sitemap(&mock_server, &["/a"]).await;
    mount_page(&mock_server, "/a", "Page A", r#"<a href="/missing-page">Gone</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/missing-page"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let report = run_check(create_test_settings(&base_url, |_| {})).await;

    assert_eq!(report.counters.unreachable, 1);
    let issue = &report.issues[0];
    assert_eq!(issue.kind, IssueKind::NormalLinkUnreachable);
    assert_eq!(issue.link, format!("{}/missing-page", base_url));
    assert_eq!(issue.detail.as_deref(), Some("404"));
    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_sitemap_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let report = run_check(create_test_settings(&mock_server.uri(), |_| {})).await;

    assert!(matches!(
        report.outcome,
        RunOutcome::Aborted(CheckError::SitemapUnavailable { .. })
    ));
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::SitemapUnavailable);
    assert_eq!(report.counters.pages_indexed, 0);
    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_external_checks_disabled() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/a"]).await;
    mount_page(
        &mock_server,
        "/a",
        "Page A",
        r##"<a href="https://other.org/x#y">Elsewhere</a>"##,
    )
    .await;

    let report = run_check(create_test_settings(&mock_server.uri(), |c| {
        c.checks.skip_external = true;
    }))
    .await;

    assert_eq!(report.counters.cannot_check_external, 1);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, IssueKind::CannotCheckExternal);
    assert_eq!(report.issues[0].severity, Severity::Info);
    assert_eq!(report.exit_code, 0);

    // Only the sitemap and the page itself were requested
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_shared_link_probed_once() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/a", "/b", "/c"]).await;
    for (page_path, title) in [("/a", "A"), ("/b", "B"), ("/c", "C")] {
        mount_page(
            &mock_server,
            page_path,
            title,
            r#"<a href="/shared">Shared</a><a href="/shared">Again</a>"#,
        )
        .await;
    }

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let report = run_check(create_test_settings(&mock_server.uri(), |_| {})).await;

    assert_eq!(report.counters.ok_normal_links, 6);
    assert_eq!(report.unique_links, 1);
    assert_eq!(report.exit_code, 0);
    // The .expect(1) above is verified when the server is dropped
}

#[tokio::test]
async fn test_redirected_internal_link_resolves() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_sitemap(&mock_server, &["/a", "/new"]).await;
    mount_page(&mock_server, "/a", "Page A", r##"<a href="/old#sec">Moved</a>"##).await;
    mount_page(&mock_server, "/new", "New", r#"<h2 id="sec">Here</h2>"#).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", base_url).as_str()),
        )
        .mount(&mock_server)
        .await;

    let report = run_check(create_test_settings(&base_url, |_| {})).await;

    assert_eq!(report.counters.ok_internal, 1);
    assert_eq!(report.counters.not_in_sitemap, 0);
    assert!(report.issues.is_empty());
}

#[tokio::test]
async fn test_unreachable_sitemap_page_is_skipped() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/gone", "/a"]).await;
    mount_page(&mock_server, "/a", "Page A", "").await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let report = run_check(create_test_settings(&mock_server.uri(), |_| {})).await;

    assert!(report.outcome.is_completed());
    assert_eq!(report.counters.pages_indexed, 1);
    assert_eq!(report.issues[0].kind, IssueKind::InternalSitemapUnreachable);
    assert_eq!(report.issues[0].detail.as_deref(), Some("HTTP 503"));
    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_external_anchor_checked() {
    let portal = MockServer::start().await;
    let outside = MockServer::start().await;
    let outside_url = format!("{}/guide", outside.uri());

    mount_sitemap(&portal, &["/a"]).await;
    mount_page(
        &portal,
        "/a",
        "Page A",
        &format!(
            r##"<a href="{0}#install">ok</a><a href="{0}#nowhere">nok</a>"##,
            outside_url
        ),
    )
    .await;
    mount_page(&outside, "/guide", "Guide", r#"<h2 id="install">Install</h2>"#).await;

    let report = run_check(create_test_settings(&portal.uri(), |_| {})).await;

    assert_eq!(report.counters.ok_anchor_outside, 1);
    assert_eq!(report.counters.nok_anchor_outside, 1);
    assert_eq!(report.issues[0].kind, IssueKind::ExternalAnchorNotFound);
    assert_eq!(report.warnings, 1);
    assert_eq!(report.exit_code, 0);
}

#[tokio::test]
async fn test_dom_extractor_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/a"]).await;
    mount_page(
        &mock_server,
        "/a",
        "Page A",
        "<h2 id='sec1'>Section</h2><a href='#sec1'>Jump</a><a href='#gone'>Broken</a>",
    )
    .await;

    let report = run_check(create_test_settings(&mock_server.uri(), |c| {
        c.checks.extractor = ExtractorKind::Dom;
    }))
    .await;

    assert_eq!(report.counters.ok_in_page, 1);
    assert_eq!(report.counters.nok_in_page, 1);
    assert_eq!(report.exit_code, 1);
}

#[tokio::test]
async fn test_config_file_severity_override() {
    let mock_server = MockServer::start().await;
    mount_sitemap(&mock_server, &["/a"]).await;
    mount_page(
        &mock_server,
        "/a",
        "Page A",
        r##"<a href="http://127.0.0.1:9/unreachable#x">Down</a>"##,
    )
    .await;

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[denylist]
normal-links = []

[severity]
outside-link-unreachable = "error"
"#,
    )
    .unwrap();
    file.flush().unwrap();

    let mut config = load_config(file.path()).expect("Failed to load config");
    config.target.domain = mock_server.uri();
    let settings = RunSettings::from_config(&config).unwrap();

    let report = run_check(settings).await;

    assert_eq!(report.counters.outside_unreachable, 1);
    assert_eq!(report.issues[0].kind, IssueKind::OutsideLinkUnreachable);
    assert_eq!(report.issues[0].severity, Severity::Error);
    assert_eq!(report.exit_code, 1);
}
