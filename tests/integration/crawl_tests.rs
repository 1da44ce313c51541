//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitecrawl::config::{Config, LinkBase};
use sitecrawl::crawler::Crawler;
use sitecrawl::output::write_csv_report_to_path;
use sitecrawl::state::BranchOutcome;
use sitecrawl::url::normalize_url;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML 200 response with the given body
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

/// Page markup linking to each of `links`
fn page_with_links(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><body><h1>{}</h1><main><p>About {}</p></main>{}</body></html>",
        title, title, anchors
    )
}

/// Mounts an HTML page at `route` that must be fetched exactly `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(&body))
        .expect(times)
        .mount(server)
        .await;
}

/// Creates a test configuration seeded at the server root
fn create_test_config(server: &MockServer, max_pages: i64, max_concurrency: u32) -> Config {
    let mut config = Config::for_seed(format!("{}/", server.uri()));
    config.crawler.max_pages = max_pages;
    config.crawler.max_concurrency = max_concurrency;
    config.crawler.request_timeout_secs = 10;
    config
}

/// Dedup key of a route on the mock server
fn key(server: &MockServer, route: &str) -> String {
    normalize_url(&format!("{}{}", server.uri(), route)).expect("valid mock URL")
}

#[tokio::test]
async fn test_small_site_with_back_link_and_foreign_link() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        page_with_links("Home", &["/a", "https://other.com/x"]),
        1,
    )
    .await;
    mount_page(&mock_server, "/a", page_with_links("A", &["/", "/b"]), 1).await;
    mount_page(&mock_server, "/b", page_with_links("B", &[]), 1).await;

    let config = create_test_config(&mock_server, 10, 5);
    let report = Crawler::new(&config).expect("Failed to create crawler").crawl().await;

    let root = key(&mock_server, "/");
    let mut keys: Vec<_> = report.visits.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, vec![root.clone(), format!("{}/a", root), format!("{}/b", root)]);

    assert!(report.visit_count(&root) >= 2);
    assert_eq!(report.visit_count(&format!("{}/a", root)), 1);
    assert_eq!(report.visit_count(&format!("{}/b", root)), 1);

    assert_eq!(report.visited.len(), 3);
    assert!(!report.budget_exhausted);
    assert_eq!(report.outcome_count(BranchOutcome::ForeignHost), 1);
    assert_eq!(report.outcome_count(BranchOutcome::Extracted), 3);

    let home = &report.pages[&root];
    assert_eq!(home.heading, "Home");
    assert_eq!(home.first_paragraph, "About Home");
    assert_eq!(
        home.links,
        vec![format!("{}/a", mock_server.uri()), "https://other.com/x".to_string()]
    );
}

#[tokio::test]
async fn test_cycle_each_page_fetched_once() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", page_with_links("Home", &["/a", "/b"]), 1).await;
    mount_page(&mock_server, "/a", page_with_links("A", &["/b", "/"]), 1).await;
    mount_page(&mock_server, "/b", page_with_links("B", &["/a", "/"]), 1).await;

    let config = create_test_config(&mock_server, 100, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    let root = key(&mock_server, "/");
    assert_eq!(report.visited.len(), 3);
    assert_eq!(report.visit_count(&root), 3);
    assert_eq!(report.visit_count(&format!("{}/a", root)), 2);
    assert_eq!(report.visit_count(&format!("{}/b", root)), 2);
    assert_eq!(report.outcome_count(BranchOutcome::AlreadyVisited), 4);
    assert_eq!(report.fetches, 3);
}

#[tokio::test]
async fn test_query_fragment_and_trailing_slash_collapse() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        page_with_links("Home", &["/p?x=1", "/p?x=2", "/p/", "#top", "/?ref=nav"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p/?$"))
        .respond_with(html(&page_with_links("P", &[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, 100, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    let root = key(&mock_server, "/");
    assert_eq!(report.visits.len(), 2);
    assert_eq!(report.visit_count(&root), 3);
    assert_eq!(report.visit_count(&format!("{}/p", root)), 3);
}

#[tokio::test]
async fn test_foreign_host_never_fetched() {
    let mock_server = MockServer::start().await;
    let other_server = MockServer::start().await;
    let other_port = other_server.address().port();

    // Same machine, different hostname
    let foreign = format!("http://localhost:{}/x", other_port);
    mount_page(&mock_server, "/", page_with_links("Home", &[foreign.as_str()]), 1).await;
    Mock::given(method("GET"))
        .respond_with(html(&page_with_links("Foreign", &[])))
        .expect(0)
        .mount(&other_server)
        .await;

    let config = create_test_config(&mock_server, 10, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert_eq!(report.visits.len(), 1);
    assert!(report.visits.keys().all(|k| !k.starts_with("localhost")));
    assert_eq!(report.outcome_count(BranchOutcome::ForeignHost), 1);
}

#[tokio::test]
async fn test_page_budget_enforced() {
    let mock_server = MockServer::start().await;

    let routes: Vec<String> = (0..20).map(|i| format!("/p{}", i)).collect();
    let route_refs: Vec<&str> = routes.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", page_with_links("Hub", &route_refs), 1).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+$"))
        .respond_with(html(&page_with_links("Leaf", &[])))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, 5, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert_eq!(report.visited.len(), 5);
    assert!(report.budget_exhausted);
    assert!(!report.interrupted);
    assert!(report.pages.len() <= 5);
    assert!(report.outcome_count(BranchOutcome::BudgetExhausted) >= 1);
    assert!(report.fetches <= 5);
    // Budget-rejected encounters are still counted in the ledger
    assert!(report.visits.len() > 5);
}

#[tokio::test]
async fn test_budget_of_one_fetches_only_seed() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", page_with_links("Home", &["/a", "/b"]), 1).await;
    mount_page(&mock_server, "/a", page_with_links("A", &[]), 0).await;
    mount_page(&mock_server, "/b", page_with_links("B", &[]), 0).await;

    let config = create_test_config(&mock_server, 0, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert_eq!(report.visited.len(), 1);
    assert!(report.visited.contains(&key(&mock_server, "/")));
    assert!(report.budget_exhausted);
    assert_eq!(report.pages.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_fetches_bounded() {
    let mock_server = MockServer::start().await;

    let routes: Vec<String> = (0..30).map(|i| format!("/slow{}", i)).collect();
    let route_refs: Vec<&str> = routes.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", page_with_links("Hub", &route_refs), 1).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/slow\d+$"))
        .respond_with(html(&page_with_links("Slow", &[])).set_delay(Duration::from_millis(50)))
        .expect(30)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, 100, 3);
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert_eq!(report.visited.len(), 31);
    assert_eq!(report.fetches, 31);
    assert!(report.peak_concurrent_fetches <= 3);
    assert!(report.peak_concurrent_fetches >= 2);
    assert_eq!(report.outcome_count(BranchOutcome::Extracted), 31);
}

#[tokio::test]
async fn test_budget_trips_while_admitted_pages_wait_at_gate() {
    let mock_server = MockServer::start().await;

    let routes: Vec<String> = (0..20).map(|i| format!("/leaf{}", i)).collect();
    let route_refs: Vec<&str> = routes.iter().map(String::as_str).collect();
    mount_page(&mock_server, "/", page_with_links("Hub", &route_refs), 1).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/leaf\d+$"))
        .respond_with(html(&page_with_links("Leaf", &[])).set_delay(Duration::from_secs(2)))
        .mount(&mock_server)
        .await;

    // One fetch at a time, so every admitted leaf queues behind the gate
    let config = create_test_config(&mock_server, 6, 1);
    let start = std::time::Instant::now();
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert_eq!(report.visited.len(), 6);
    assert!(report.budget_exhausted);
    assert_eq!(report.peak_concurrent_fetches, 1);

    // All 20 leaves passed admission before any leaf fetch finished
    assert_eq!(report.visits.len(), 21);
    assert_eq!(report.outcome_count(BranchOutcome::BudgetExhausted), 15);

    // The admitted leaves were cancelled rather than fetched one after another
    assert_eq!(report.outcome_count(BranchOutcome::Cancelled), 5);
    assert_eq!(report.outcome_count(BranchOutcome::Extracted), 1);
    assert_eq!(report.pages.len(), 1);
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_failed_pages_do_not_abort_siblings() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        page_with_links("Home", &["/json", "/error", "/garbage", "/ok"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"links": ["/hidden"]}"#, "application/json"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/error"))
        .respond_with(
            ResponseTemplate::new(500).set_body_raw(page_with_links("E", &["/hidden"]), "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(html("}{ this is not markup at all"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/ok", page_with_links("Ok", &[]), 1).await;
    mount_page(&mock_server, "/hidden", page_with_links("Hidden", &[]), 0).await;

    let config = create_test_config(&mock_server, 100, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    let root = key(&mock_server, "/");
    assert_eq!(report.visited.len(), 5);
    assert_eq!(report.outcome_count(BranchOutcome::ContentMismatch), 1);
    assert_eq!(report.outcome_count(BranchOutcome::UnsupportedStatus), 1);
    assert_eq!(report.outcome_count(BranchOutcome::Degraded), 1);
    assert_eq!(report.outcome_count(BranchOutcome::Extracted), 2);

    assert!(!report.pages.contains_key(&format!("{}/json", root)));
    assert!(!report.pages.contains_key(&format!("{}/error", root)));

    let garbage = &report.pages[&format!("{}/garbage", root)];
    assert_eq!(garbage.heading, "");
    assert_eq!(garbage.first_paragraph, "");
    assert!(garbage.links.is_empty());

    assert_eq!(report.pages[&format!("{}/ok", root)].heading, "Ok");
}

#[tokio::test]
async fn test_seed_failure_ends_crawl_cleanly() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, 10, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert_eq!(report.visited.len(), 1);
    assert!(report.pages.is_empty());
    assert_eq!(report.outcome_count(BranchOutcome::UnsupportedStatus), 1);
}

#[tokio::test]
async fn test_relative_links_resolved_against_seed() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", page_with_links("Home", &["/docs/guide"]), 1).await;
    mount_page(&mock_server, "/docs/guide", page_with_links("Guide", &["intro"]), 1).await;
    mount_page(&mock_server, "/intro", page_with_links("Intro", &[]), 1).await;
    mount_page(&mock_server, "/docs/intro", page_with_links("Docs intro", &[]), 0).await;

    let config = create_test_config(&mock_server, 10, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert!(report.visited.contains(&key(&mock_server, "/intro")));
    assert!(!report.visits.contains_key(&key(&mock_server, "/docs/intro")));
}

#[tokio::test]
async fn test_relative_links_resolved_against_page_when_configured() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", page_with_links("Home", &["/docs/guide"]), 1).await;
    mount_page(&mock_server, "/docs/guide", page_with_links("Guide", &["intro"]), 1).await;
    mount_page(&mock_server, "/intro", page_with_links("Intro", &[]), 0).await;
    mount_page(&mock_server, "/docs/intro", page_with_links("Docs intro", &[]), 1).await;

    let mut config = create_test_config(&mock_server, 10, 5);
    config.crawler.link_base = LinkBase::Page;
    let report = Crawler::new(&config).unwrap().crawl().await;

    assert!(report.visited.contains(&key(&mock_server, "/docs/intro")));
}

#[tokio::test]
async fn test_external_cancellation_aborts_in_flight_fetch() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html(&page_with_links("Slow", &["/a"])).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server, 10, 5);
    let crawler = Crawler::new(&config).unwrap();
    let cancel = crawler.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let report = tokio::time::timeout(Duration::from_secs(3), crawler.crawl())
        .await
        .expect("crawl should stop promptly after cancellation");

    assert!(report.interrupted);
    assert!(!report.budget_exhausted);
    assert_eq!(report.outcome_count(BranchOutcome::Cancelled), 1);
    assert!(report.pages.is_empty());
}

#[tokio::test]
async fn test_csv_report_from_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", page_with_links("Home, sweet home", &["/a"]), 1).await;
    mount_page(&mock_server, "/a", page_with_links("A", &[]), 1).await;

    let config = create_test_config(&mock_server, 10, 5);
    let report = Crawler::new(&config).unwrap().crawl().await;

    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("pages.csv");
    write_csv_report_to_path(&report_path, &report.pages).unwrap();

    let content = std::fs::read_to_string(&report_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "url,heading,first_paragraph,links,images");
    assert!(lines[1].contains("\"Home, sweet home\""));
    assert!(lines[1].ends_with(&format!("{}/a,", mock_server.uri())));
}
