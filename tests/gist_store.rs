// tests/gist_store.rs
//
// Gist-backed key-value store against a local GitHub API stand-in (wiremock),
// plus the StateStore load/save policy on top of it.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use borderadar::config::Limits;
use borderadar::store::{GistStore, KvStore, StoreError};
use borderadar::{HistoricalEvent, PersistedState, StateStore};

const KEY: &str = "borderadar_state.json";

fn store(server: &MockServer) -> GistStore {
    GistStore::new(&server.uri(), "abc123", "secret").expect("client builds")
}

#[tokio::test]
async fn get_returns_inline_file_content() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .and(header("authorization", "token secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc123",
            "files": { KEY: { "filename": KEY, "content": "{\"events\":[]}", "truncated": false } }
        })))
        .mount(&server)
        .await;

    let doc = store(&server).get(KEY).await.expect("get ok");
    assert_eq!(doc.as_deref(), Some("{\"events\":[]}"));
}

#[tokio::test]
async fn get_follows_raw_url_for_truncated_files() {
    let server = MockServer::start().await;
    let raw_url = format!("{}/raw/abc123/{KEY}", server.uri());
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": { KEY: { "content": "{\"ev", "truncated": true, "raw_url": raw_url } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/raw/abc123/{KEY}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"events\":[]}"))
        .expect(1)
        .mount(&server)
        .await;

    let doc = store(&server).get(KEY).await.expect("get ok");
    assert_eq!(doc.as_deref(), Some("{\"events\":[]}"));
}

#[tokio::test]
async fn missing_file_is_none_and_http_error_is_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": {} })))
        .mount(&server)
        .await;
    assert!(store(&server).get(KEY).await.unwrap().is_none());

    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&down)
        .await;
    let err = store(&down).get(KEY).await.expect_err("404 must fail");
    assert!(matches!(err, StoreError::Status { status: 404 }));
}

#[tokio::test]
async fn put_patches_whole_document_under_file_key() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_partial_json(json!({ "files": { KEY: { "content": "{}" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    store(&server).put(KEY, "{}").await.expect("put ok");
}

#[tokio::test]
async fn state_store_round_trips_through_gist() {
    let server = MockServer::start().await;
    let state_store = StateStore::new(Arc::new(store(&server)), KEY);

    let mut state = PersistedState::default();
    state.record(
        HistoricalEvent {
            identifier: "x".into(),
            title: "Clash".into(),
            link: "https://l".into(),
            published_at: chrono::Utc::now(),
            source_name: "AP".into(),
            sector: None,
            fetched_at: chrono::Utc::now(),
        },
        &Limits::default(),
    );
    let doc = serde_json::to_string_pretty(&state).unwrap();

    Mock::given(method("PATCH"))
        .and(path("/gists/abc123"))
        .and(body_partial_json(json!({ "files": { KEY: { "content": doc } } })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gists/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": { KEY: { "content": doc, "truncated": false } }
        })))
        .mount(&server)
        .await;

    state_store.save(&state).await.expect("save ok");
    assert_eq!(state_store.load().await, state);
}

#[tokio::test]
async fn state_store_degrades_to_empty_on_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let state_store = StateStore::new(Arc::new(store(&server)), KEY);

    assert_eq!(state_store.load().await, PersistedState::default());
    let err = state_store
        .save(&PersistedState::default())
        .await
        .expect_err("502 must surface to the caller");
    assert!(matches!(err, StoreError::Status { status: 502 }));
}

#[tokio::test]
async fn disabled_state_store_is_a_no_op() {
    let s = StateStore::disabled();
    assert!(!s.is_enabled());
    assert_eq!(s.load().await, PersistedState::default());
    s.save(&PersistedState::default()).await.expect("no-op save");
}
