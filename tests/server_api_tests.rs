mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use atlas::data::DataRegistry;
use atlas::server::routes::RELOAD_TOKEN_HEADER;
use atlas::server::{router, AppState};

use common::{fixture_dir, fixture_snapshot};

fn app() -> Router {
    let registry = DataRegistry::from_snapshots(fixture_dir(), [fixture_snapshot()]);
    router(AppState::new(registry, Some("secret".to_string())))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let payload = serde_json::from_slice(&bytes).expect("response should be valid json");
    (status, payload)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("reverse list should be an array")
        .iter()
        .map(|entity| entity["id"].as_i64().expect("entity should carry an id"))
        .collect()
}

#[tokio::test]
async fn health_lists_served_regions() {
    let (status, payload) = get(&app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["status"], "ok");
    assert_eq!(payload["service"], "atlas");
    assert_eq!(payload["regions"], serde_json::json!(["JP"]));
}

#[tokio::test]
async fn nice_buff_with_full_reverse_tree() {
    let (status, payload) = get(
        &app(),
        "/JP/nice/buff/101?reverse=true&reverseDepth=servant",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["id"], 101);
    assert_eq!(payload["name"], "ATK Up");

    let function = &payload["reverse"]["function"][0];
    assert_eq!(function["funcId"], 201);
    assert_eq!(function["funcType"], "addState");
    assert_eq!(ids(&function["reverse"]["skill"]), vec![301, 302, 303]);
    assert_eq!(ids(&function["reverse"]["NP"]), vec![401]);

    let skill = &function["reverse"]["skill"][0];
    assert_eq!(ids(&skill["reverse"]["servant"]), vec![100100]);
    assert_eq!(skill["reverse"]["MC"], serde_json::json!([]));
    assert!(skill["reverse"]["servant"][0].get("reverse").is_none());
}

#[tokio::test]
async fn basic_skill_reverse_merges_owners() {
    let (status, payload) = get(&app(), "/JP/basic/skill/302?reverse=true").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&payload["reverse"]["servant"]), vec![100200]);
    assert!(payload.get("functions").is_none());
}

#[tokio::test]
async fn missing_entities_and_regions_are_not_found() {
    let app = app();
    for uri in ["/JP/nice/buff/999", "/KR/nice/buff/101", "/NA/nice/buff/101", "/JP/nice/quest/1"] {
        let (status, payload) = get(&app, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(payload["status"], "error");
        assert!(payload["message"].as_str().is_some());
    }
}

#[tokio::test]
async fn bad_parameters_are_rejected() {
    let app = app();
    let (status, payload) = get(&app, "/JP/nice/buff/101?reverse=true&reverseDepth=quest").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["status"], "error");

    let (status, _) = get(&app, "/JP/nice/buff/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/JP/utils/decode?raw=%5B1000%2Cx%5D&funcType=gainNp").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn decode_utility_applies_post_pass() {
    let (status, payload) = get(
        &app(),
        "/JP/utils/decode?raw=%5B2%2C400%2C80017%5D&funcType=classDropUp",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload, serde_json::json!({"RateCount": 400, "EventId": 80017}));
}

#[tokio::test]
async fn info_reports_version_and_index() {
    let (status, payload) = get(&app(), "/JP/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["region"], "JP");
    assert_eq!(payload["generation"], 1);
    assert!(payload["loadedAt"].as_str().is_some());
    assert_eq!(payload["tables"]["servant"], 2);
    assert_eq!(payload["index"]["buffToFunction"], 1);
}

#[tokio::test]
async fn reload_requires_token_and_bumps_generation() {
    let app = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/JP/reload")
        .body(Body::empty())
        .expect("request should build");
    let (status, payload) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(payload["status"], "error");

    let request = Request::builder()
        .method(Method::POST)
        .uri("/JP/reload")
        .header(RELOAD_TOKEN_HEADER, "secret")
        .body(Body::empty())
        .expect("request should build");
    let (status, payload) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["region"], "JP");
    assert_eq!(payload["generation"], 2);

    let (_, info) = get(&app, "/JP/info").await;
    assert_eq!(info["generation"], 2);
}
