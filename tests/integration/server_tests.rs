//! Integration tests for the search server
//!
//! Requests are driven straight through the router with `oneshot`; no
//! socket is bound.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use linkrank::server::render::encode_segment;
use linkrank::server::{create_router, AppState};
use linkrank::storage::{SqliteStorage, Storage};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Two partitions; `fruits` is crawled and ranked, `personal` is empty
fn app() -> Router {
    let mut storage = SqliteStorage::new_in_memory().expect("Failed to open storage");
    let pages = [
        ("https://a.test/kiwi", "Kiwi", "<p>The kiwi is a small fruit</p>", 0.2),
        ("https://a.test/banana", "Banana", "<p>A banana is a fruit, kiwi mentioned once</p>", 0.5),
        ("https://a.test/apple", "Apple", "<p>Apples grow on trees</p>", 0.3),
    ];
    for (url, title, content, _) in &pages {
        storage.insert_page("fruits", url, title, content).unwrap();
    }
    storage.insert_edge("fruits", "https://a.test/banana", "https://a.test/kiwi").unwrap();
    storage.insert_edge("fruits", "https://a.test/apple", "https://a.test/kiwi").unwrap();
    storage.insert_edge("fruits", "https://a.test/kiwi", "https://a.test/apple").unwrap();
    let ranks: Vec<(String, f64)> = pages
        .iter()
        .map(|(url, _, _, rank)| (url.to_string(), *rank))
        .collect();
    storage.update_ranks("fruits", &ranks).unwrap();

    let names = vec!["fruits".to_string(), "personal".to_string()];
    let state = AppState::new(Arc::new(Mutex::new(storage)), &names).expect("Failed to index");
    create_router(state)
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_str(&body).expect("Response is not JSON"))
}

fn urls(hits: &Value) -> Vec<&str> {
    hits.as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["url"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_search_json_orders_by_relevance() {
    let (status, hits) = get_json(app(), "/fruits?q=kiwi&format=json").await;

    assert_eq!(status, StatusCode::OK);
    // The title match outweighs a single body mention
    assert_eq!(urls(&hits), vec!["https://a.test/kiwi", "https://a.test/banana"]);
    assert!((hits[0]["rank"].as_f64().unwrap() - 0.2).abs() < 1e-12);
    assert_eq!(hits[0]["title"], "Kiwi");
}

#[tokio::test]
async fn test_search_boost_reorders_by_rank() {
    let (_, plain) = get_json(app(), "/fruits?q=fruit&format=json").await;
    let (_, boosted) = get_json(app(), "/fruits?q=fruit&boost=true&format=json").await;

    let boosted_urls = urls(&boosted);
    assert_eq!(boosted_urls.len(), 2);
    assert_eq!(urls(&plain).len(), 2);

    // Boosted scores are relevance times rank, in descending order
    let scores: Vec<f64> = boosted
        .as_array()
        .unwrap()
        .iter()
        .map(|hit| hit["score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    for hit in boosted.as_array().unwrap() {
        let url = hit["url"].as_str().unwrap();
        let relevance = plain
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["url"] == url)
            .unwrap()["score"]
            .as_f64()
            .unwrap();
        let expected = relevance * hit["rank"].as_f64().unwrap();
        assert!((hit["score"].as_f64().unwrap() - expected).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_search_limit_is_clamped() {
    let (_, hits) = get_json(app(), "/fruits?q=kiwi&limit=1&format=json").await;
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (status, hits) = get_json(app(), "/fruits?q=kiwi&limit=-5&format=json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (status, hits) = get_json(app(), "/fruits?q=kiwi&limit=0&format=json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (status, hits) = get_json(app(), "/fruits?q=kiwi&limit=abc&format=json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_empty_query_and_empty_partition() {
    let (status, hits) = get_json(app(), "/fruits?format=json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(hits.as_array().unwrap().is_empty());

    let (status, hits) = get_json(app(), "/personal?q=kiwi&format=json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(hits.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_html() {
    let (status, body) = get(app(), "/fruits?q=kiwi&boost=true").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<form action=\"/fruits\""));
    assert!(body.contains("value=\"kiwi\""));
    assert!(body.contains(" checked"));
    assert!(body.contains(&format!(
        "/page-data/fruits/{}",
        encode_segment("https://a.test/kiwi")
    )));
}

#[tokio::test]
async fn test_unknown_partition_is_not_found() {
    let (status, body) = get_json(app(), "/vegetables?q=kiwi&format=json").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("vegetables"));
}

#[tokio::test]
async fn test_page_data_json() {
    let uri = format!(
        "/page-data/fruits/{}?format=json",
        encode_segment("https://a.test/kiwi")
    );
    let (status, detail) = get_json(app(), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["url"], "https://a.test/kiwi");
    assert_eq!(detail["title"], "Kiwi");
    assert_eq!(detail["word_frequency"]["kiwi"], 1);
    assert_eq!(detail["outgoing_links"], serde_json::json!(["https://a.test/apple"]));
    let mut incoming: Vec<&str> = detail["incoming_links"]
        .as_array()
        .unwrap()
        .iter()
        .map(|link| link.as_str().unwrap())
        .collect();
    incoming.sort_unstable();
    assert_eq!(incoming, vec!["https://a.test/apple", "https://a.test/banana"]);
}

#[tokio::test]
async fn test_page_data_html() {
    let uri = format!("/page-data/fruits/{}", encode_segment("https://a.test/kiwi"));
    let (status, body) = get(app(), &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<h1>Kiwi</h1>"));
    assert!(body.contains("Incoming Links"));
}

#[tokio::test]
async fn test_page_data_missing_page() {
    let uri = format!("/page-data/fruits/{}", encode_segment("https://a.test/durian"));
    let (status, body) = get_json(app(), &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Page not found in database");
}
