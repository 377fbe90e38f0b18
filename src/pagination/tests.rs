//! Cursor tests against a mock paginated endpoint

use super::*;
use crate::error::Error;
use crate::http::{AuthStrategy, HttpClient, HttpClientConfig};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: String,
}

fn cursor_for(server: &MockServer) -> Cursor<Item> {
    let http =
        HttpClient::new(HttpClientConfig::builder().base_url(server.uri()).build()).unwrap();
    Cursor::new(http, "/2/users/42/followers")
        .param("max_results", "2")
        .auth(AuthStrategy::None)
}

/// Mount a three-page collection. Each page is served at most once, so a
/// refetch falls through to a 404; tests that only consume part of the
/// collection stay valid, and cached-replay tests assert the request
/// count explicitly.
async fn mount_three_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/2/users/42/followers"))
        .and(query_param_is_missing("pagination_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "1"}, {"id": "2"}],
            "meta": {"result_count": 2, "next_token": "t2"}
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/42/followers"))
        .and(query_param("pagination_token", "t2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "3"}, {"id": "4"}],
            "meta": {"result_count": 2, "next_token": "t3", "previous_token": "t1"}
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/2/users/42/followers"))
        .and(query_param("pagination_token", "t3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "5"}],
            "meta": {"result_count": 1, "previous_token": "t2"}
        })))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

fn ids(page: &Page<Item>) -> Vec<&str> {
    page.items.iter().map(|i| i.id.as_str()).collect()
}

#[tokio::test]
async fn test_walk_forward_then_back_uses_cache() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let mut cursor = cursor_for(&server);
    assert_eq!(cursor.position(), 0);
    assert!(cursor.current_page().is_none());

    assert_eq!(ids(cursor.next_page().await.unwrap()), ["1", "2"]);
    assert_eq!(ids(cursor.next_page().await.unwrap()), ["3", "4"]);
    assert_eq!(ids(cursor.next_page().await.unwrap()), ["5"]);
    assert_eq!(cursor.position(), 3);

    // backward replay, then forward again, all from the cache
    assert_eq!(ids(cursor.previous_page().unwrap()), ["3", "4"]);
    assert_eq!(ids(cursor.previous_page().unwrap()), ["1", "2"]);
    assert_eq!(cursor.position(), 1);
    assert_eq!(ids(cursor.next_page().await.unwrap()), ["3", "4"]);
    assert_eq!(ids(cursor.next_page().await.unwrap()), ["5"]);

    // three fetches total: the replayed pages never hit the server again
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert_eq!(cursor.visited_pages().len(), 3);
}

#[tokio::test]
async fn test_exhausted_cursor_reports_no_page_and_holds_position() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let mut cursor = cursor_for(&server);
    cursor.next_page().await.unwrap();
    cursor.next_page().await.unwrap();
    cursor.next_page().await.unwrap();

    let err = cursor.next_page().await.unwrap_err();
    assert!(matches!(err, Error::NoPageAvailable));
    assert_eq!(cursor.position(), 3);
    assert_eq!(ids(cursor.current_page().unwrap()), ["5"]);
}

#[tokio::test]
async fn test_previous_at_first_page_reports_no_page() {
    let server = MockServer::start().await;
    mount_three_pages(&server).await;

    let mut cursor = cursor_for(&server);

    // before any fetch
    assert!(matches!(
        cursor.previous_page().unwrap_err(),
        Error::NoPageAvailable
    ));
    assert_eq!(cursor.position(), 0);

    cursor.next_page().await.unwrap();
    assert!(matches!(
        cursor.previous_page().unwrap_err(),
        Error::NoPageAvailable
    ));
    assert_eq!(cursor.position(), 1);

    // only the first page was ever requested
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_data_field_yields_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/42/followers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"meta": {"result_count": 0}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cursor = cursor_for(&server);
    let page = cursor.next_page().await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.next_token.is_none());

    // empty page is still a page; walking past it is exhaustion
    let err = cursor.next_page().await.unwrap_err();
    assert!(matches!(err, Error::NoPageAvailable));
}

#[tokio::test]
async fn test_http_error_propagates_without_moving() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/users/42/followers"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .expect(1)
        .mount(&server)
        .await;

    let mut cursor = cursor_for(&server);
    let err = cursor.next_page().await.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(cursor.position(), 0);
    assert!(cursor.visited_pages().is_empty());
}
