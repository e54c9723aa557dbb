//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl and rank cycle end-to-end.

use linkrank::config::{parse_config, Config};
use linkrank::crawler::{run_crawl, Coordinator, HttpFetcher};
use linkrank::storage::{SqliteStorage, Storage};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a pattern partition and a catch-all
fn create_test_config(base_url: &str, max_pages: u32, db_path: &str, extra: &str) -> Config {
    parse_config(&format!(
        r#"
        {extra}

        [crawler]
        max-connections = 4
        rate-limit-ms = 0
        max-pages-per-partition = {max_pages}
        request-timeout-secs = 5

        [user-agent]
        crawler-name = "TestBot"
        crawler-version = "1.0.0"
        contact-url = "https://example.com/contact"

        [storage]
        database-path = "{db_path}"

        [[partition]]
        name = "fruits"
        url-patterns = ["/fruitgraph/"]
        seeds = ["{base_url}/fruitgraph/N-0.html"]

        [[partition]]
        name = "personal"
        seeds = ["{base_url}/home"]
        "#
    ))
    .expect("Failed to parse test config")
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(server)
        .await;
}

fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{} page</p>{}</body></html>",
        title, title, anchors
    )
}

async fn crawl_in_memory(config: Config) -> Arc<Mutex<SqliteStorage>> {
    let storage = Arc::new(Mutex::new(
        SqliteStorage::new_in_memory().expect("Failed to open storage"),
    ));
    let fetcher = HttpFetcher::from_config(&config).expect("Failed to build client");
    let coordinator = Coordinator::new(config, "test".to_string(), Arc::clone(&storage), fetcher);
    coordinator.run().await.expect("Crawl failed");
    storage
}

#[tokio::test]
async fn test_full_crawl_two_partitions() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_html(
        &mock_server,
        "/fruitgraph/N-0.html",
        page(
            "N-0",
            &[
                "N-1.html",
                "N-2.html",
                "photo.png",
                "/home",
                "#top",
                "mailto:someone@example.com",
            ],
        ),
    )
    .await;
    mount_html(&mock_server, "/fruitgraph/N-1.html", page("N-1", &["N-2.html"])).await;
    mount_html(&mock_server, "/fruitgraph/N-2.html", page("N-2", &["N-0.html", "gone.html"])).await;
    mount_html(&mock_server, "/home", page("Home", &["/about"])).await;
    mount_html(&mock_server, "/about", page("About", &["/home"])).await;

    Mock::given(method("GET"))
        .and(path("/fruitgraph/photo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 16], "image/png"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base, 100, "unused.db", "");
    let storage = crawl_in_memory(config).await;
    let storage = storage.lock().unwrap();

    // HTML pages only; the image and the 404 leave no page row
    let fruit_urls: HashSet<String> = storage.list_page_urls("fruits").unwrap().into_iter().collect();
    let expected: HashSet<String> = ["N-0.html", "N-1.html", "N-2.html"]
        .iter()
        .map(|p| format!("{}/fruitgraph/{}", base, p))
        .collect();
    assert_eq!(fruit_urls, expected);
    assert_eq!(storage.count_pages("personal").unwrap(), 2);

    // Edges are recorded whether or not the target was stored
    let outgoing = storage
        .outgoing_links("fruits", &format!("{}/fruitgraph/N-0.html", base))
        .unwrap();
    assert!(outgoing.contains(&format!("{}/fruitgraph/photo.png", base)));
    assert!(outgoing.contains(&format!("{}/home", base)));
    assert!(!outgoing.iter().any(|link| link.starts_with("mailto:")));
    assert_eq!(outgoing.len(), 4);
    assert!(storage
        .incoming_links("fruits", &format!("{}/fruitgraph/gone.html", base))
        .unwrap()
        .contains(&format!("{}/fruitgraph/N-2.html", base)));

    // Every stored page is ranked and each partition's scores sum to 1
    for partition in ["fruits", "personal"] {
        let pages = storage.list_pages(partition).unwrap();
        let total: f64 = pages.iter().map(|p| p.rank.expect("page not ranked")).sum();
        assert!((total - 1.0).abs() < 1e-6, "{} ranks sum to {}", partition, total);
    }

    let run = storage.latest_run("fruits").unwrap().unwrap();
    assert_eq!(run.pages_stored, 3);
    assert_eq!(run.fetch_failures, 1);
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_page_quota_is_exact() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    let all: Vec<String> = (0..6).map(|i| format!("N-{}.html", i)).collect();
    let links: Vec<&str> = all.iter().map(String::as_str).collect();
    for i in 0..6 {
        mount_html(
            &mock_server,
            &format!("/fruitgraph/N-{}.html", i),
            page(&format!("N-{}", i), &links),
        )
        .await;
    }
    mount_html(&mock_server, "/home", page("Home", &[])).await;

    let config = create_test_config(&base, 2, "unused.db", "");
    let storage = crawl_in_memory(config).await;
    let storage = storage.lock().unwrap();

    assert_eq!(storage.count_pages("fruits").unwrap(), 2);

    // Edges only leave pages that were stored
    let stored: HashSet<String> = storage.list_page_urls("fruits").unwrap().into_iter().collect();
    for edge in storage.list_edges("fruits").unwrap() {
        assert!(stored.contains(&edge.source), "edge from unstored {}", edge.source);
    }
    assert_eq!(storage.count_ranked_pages("fruits").unwrap(), 2);
}

#[tokio::test]
async fn test_each_url_fetched_once() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_html(
        &mock_server,
        "/fruitgraph/N-0.html",
        page("N-0", &["N-1.html", "N-2.html", "N-3.html"]),
    )
    .await;
    mount_html(&mock_server, "/fruitgraph/N-1.html", page("N-1", &["N-3.html", "N-0.html"])).await;
    mount_html(&mock_server, "/fruitgraph/N-2.html", page("N-2", &["N-3.html", "N-1.html"])).await;
    mount_html(&mock_server, "/home", page("Home", &[])).await;

    Mock::given(method("GET"))
        .and(path("/fruitgraph/N-3.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("N-3", &["N-0.html"]), "text/html"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base, 100, "unused.db", "");
    let storage = crawl_in_memory(config).await;

    assert_eq!(storage.lock().unwrap().count_pages("fruits").unwrap(), 4);
}

#[tokio::test]
async fn test_disallowed_url_never_requested() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_html(&mock_server, "/fruitgraph/N-0.html", page("N-0", &["secret.html"])).await;
    mount_html(&mock_server, "/home", page("Home", &[])).await;

    Mock::given(method("GET"))
        .and(path("/fruitgraph/secret.html"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page("Secret", &[]), "text/html"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let disallow = format!(r#"disallow = ["{}/fruitgraph/secret.html"]"#, base);
    let config = create_test_config(&base, 100, "unused.db", &disallow);
    let storage = crawl_in_memory(config).await;
    let storage = storage.lock().unwrap();

    assert_eq!(storage.count_pages("fruits").unwrap(), 1);
    // The link itself is still part of the graph
    assert_eq!(storage.count_edges("fruits").unwrap(), 1);
}

#[tokio::test]
async fn test_run_crawl_fresh_clears_previous_results() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_html(&mock_server, "/fruitgraph/N-0.html", page("N-0", &[])).await;
    mount_html(&mock_server, "/home", page("Home", &[])).await;

    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("crawl.db");
    let db_path = db_path.to_str().expect("Non-UTF-8 temp path");

    let config = create_test_config(&base, 100, db_path, "");
    let reports = run_crawl(config.clone(), "first".to_string(), false)
        .await
        .expect("First crawl failed");
    assert_eq!(reports.len(), 2);

    {
        let mut storage = SqliteStorage::new(std::path::Path::new(db_path)).unwrap();
        assert_eq!(storage.count_pages("fruits").unwrap(), 1);
        storage
            .insert_page("fruits", "https://stale.test/fruitgraph/", "Stale", "")
            .unwrap();
    }

    run_crawl(config, "second".to_string(), true)
        .await
        .expect("Fresh crawl failed");

    let storage = SqliteStorage::new(std::path::Path::new(db_path)).unwrap();
    assert_eq!(storage.count_pages("fruits").unwrap(), 1);
    assert!(storage
        .get_page("fruits", "https://stale.test/fruitgraph/")
        .unwrap()
        .is_none());
    assert_eq!(storage.latest_run("fruits").unwrap().unwrap().config_hash, "second");
}
