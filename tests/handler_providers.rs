mod common;

use axum::Router;
use axum::http::StatusCode;
use axum_test::TestServer;
use common::TestPipeline;
use serde_json::json;
use provider_rating::api::routes::api_routes;
use provider_rating::infrastructure::cache::average_rating_key;

fn make_server(p: &TestPipeline) -> TestServer {
    let app = Router::new()
        .nest("/api", api_routes())
        .with_state(p.state.clone());
    TestServer::new(app).unwrap()
}

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_provider() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);

    let response = server
        .post("/api/providers")
        .json(&json!({ "name": "Acme Plumbing" }))
        .await;

    response.assert_status(StatusCode::CREATED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["name"], "Acme Plumbing");
    assert_eq!(json["averageRating"], 0.0);
    assert_eq!(json["ratingCount"], 0);
    assert!(json.get("version").is_none());
}

#[tokio::test]
async fn test_create_provider_duplicate_name() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);
    p.provider("Acme Plumbing").await;

    let response = server
        .post("/api/providers")
        .json(&json!({ "name": "Acme Plumbing" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_provider_empty_name() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);

    let response = server
        .post("/api/providers")
        .json(&json!({ "name": "" }))
        .await;

    response.assert_status_bad_request();
}

// ─── READ ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_providers() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);
    p.provider("Acme Plumbing").await;
    p.provider("Best Builders").await;

    let response = server.get("/api/providers").await;

    response.assert_status_ok();
    let json = response.json::<serde_json::Value>();
    let items = json["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items[0].get("lastUpdatedDate").is_some());
}

#[tokio::test]
async fn test_get_provider_not_found() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);

    let response = server.get("/api/providers/424242").await;

    response.assert_status_not_found();
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "not_found");
}

// ─── AVERAGE ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_average_rating_cache_miss_then_hit() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);
    let provider = p.provider("Acme Plumbing").await;
    let url = format!("/api/providers/{}/average-rating", provider.id);

    let first = server.get(&url).await;
    first.assert_status_ok();
    let json = first.json::<serde_json::Value>();
    assert_eq!(json["providerId"], provider.id);
    assert_eq!(json["averageRating"], 0.0);
    assert_eq!(json["cached"], false);
    assert!(p.cache.contains(&average_rating_key(provider.id)));

    let second = server.get(&url).await.json::<serde_json::Value>();
    assert_eq!(second["cached"], true);
}

#[tokio::test]
async fn test_average_rating_unknown_provider() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);

    let response = server.get("/api/providers/77/average-rating").await;

    response.assert_status_not_found();
    assert!(!p.cache.contains(&average_rating_key(77)));
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_provider() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);
    let provider = p.provider("Acme Plumbing").await;

    server
        .delete(&format!("/api/providers/{}", provider.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&format!("/api/providers/{}", provider.id))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/api/providers/{}", provider.id))
        .await
        .assert_status_not_found();
}
