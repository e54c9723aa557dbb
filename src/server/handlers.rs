use crate::search::{parse_limit, word_frequency, SearchHit, SearchQuery};
use crate::server::error::ApiError;
use crate::server::render;
use crate::server::AppState;
use crate::storage::{self, Storage};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub boost: Option<String>,
    pub limit: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FormatParams {
    pub format: Option<String>,
}

fn wants_json(format: Option<&str>) -> bool {
    format == Some("json")
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Everything the page-detail view shows about one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDetail {
    pub url: String,
    pub title: String,
    pub rank: Option<f64>,
    pub incoming_links: Vec<String>,
    pub outgoing_links: Vec<String>,
    pub word_frequency: BTreeMap<String, u64>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET /{partition}?q=&boost=&limit=&format=`
pub async fn search(
    State(state): State<AppState>,
    Path(partition): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<Response, ApiError> {
    let index = state
        .search_index(&partition)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown partition '{}'", partition)))?;

    let query = SearchQuery::new(
        params.q.unwrap_or_default(),
        params.boost.as_deref() == Some("true"),
        parse_limit(params.limit.as_deref()),
    );
    let hits: Vec<SearchHit> = index.search(&query);

    tracing::debug!(
        "Search '{}' in '{}' (boost: {}, limit: {}): {} hits",
        query.text,
        partition,
        query.boost,
        query.limit,
        hits.len()
    );

    if wants_json(params.format.as_deref()) {
        Ok(Json(hits).into_response())
    } else {
        Ok(Html(render::search_page(&partition, &query, &hits)).into_response())
    }
}

/// `GET /page-data/{partition}/{url}`
pub async fn page_data(
    State(state): State<AppState>,
    Path((partition, url)): Path<(String, String)>,
    Query(params): Query<FormatParams>,
) -> Result<Response, ApiError> {
    if state.search_index(&partition).is_none() {
        return Err(ApiError::NotFound(format!("Unknown partition '{}'", partition)));
    }

    let shared = state.storage();
    let detail = tokio::task::spawn_blocking(move || load_page_detail(&*shared, &partition, &url))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    if wants_json(params.format.as_deref()) {
        Ok(Json(detail).into_response())
    } else {
        Ok(Html(render::page_detail(&detail)).into_response())
    }
}

fn load_page_detail<S: Storage>(
    shared: &std::sync::Mutex<S>,
    partition: &str,
    url: &str,
) -> Result<PageDetail, ApiError> {
    let storage = storage::lock(shared);

    let page = storage
        .get_page(partition, url)?
        .ok_or_else(|| ApiError::NotFound("Page not found in database".to_string()))?;

    Ok(PageDetail {
        incoming_links: storage.incoming_links(partition, url)?,
        outgoing_links: storage.outgoing_links(partition, url)?,
        word_frequency: word_frequency(&page.content),
        url: page.url,
        title: page.title,
        rank: page.rank,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;
    use std::sync::Mutex;

    #[test]
    fn test_wants_json() {
        assert!(wants_json(Some("json")));
        assert!(!wants_json(Some("html")));
        assert!(!wants_json(Some("JSON")));
        assert!(!wants_json(None));
    }

    #[test]
    fn test_load_page_detail() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_page("p", "https://a.test/", "Home", "<p>Kiwi kiwi</p>")
            .unwrap();
        storage.insert_edge("p", "https://a.test/", "https://a.test/x").unwrap();
        storage.insert_edge("p", "https://a.test/y", "https://a.test/").unwrap();
        let shared = Mutex::new(storage);

        let detail = load_page_detail(&shared, "p", "https://a.test/").unwrap();

        assert_eq!(detail.title, "Home");
        assert_eq!(detail.rank, None);
        assert_eq!(detail.incoming_links, vec!["https://a.test/y"]);
        assert_eq!(detail.outgoing_links, vec!["https://a.test/x"]);
        assert_eq!(detail.word_frequency["kiwi"], 2);
        assert_eq!(detail.word_frequency["p"], 2);
    }

    #[test]
    fn test_missing_page_is_not_found() {
        let shared = Mutex::new(SqliteStorage::new_in_memory().unwrap());
        let result = load_page_detail(&shared, "p", "https://nowhere.test/");
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
