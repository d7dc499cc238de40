mod common;

use axum::Router;
use axum_test::TestServer;
use common::TestPipeline;
use serde_json::json;
use provider_rating::api::routes::api_routes;
use provider_rating::infrastructure::cache::{CacheService, average_rating_key};
use provider_rating::infrastructure::staging::StagingStore;

fn make_server(p: &TestPipeline) -> TestServer {
    let app = Router::new()
        .nest("/api", api_routes())
        .with_state(p.state.clone());
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_submit_rating_accepted() {
    let p = common::pipeline(5).await;
    let provider = p.provider("Acme Plumbing").await;
    let user = p.user("alice").await;
    let server = make_server(&p);

    let response = server
        .post("/api/ratings")
        .json(&json!({
            "providerId": provider.id,
            "userId": user.id,
            "ratingValue": 4
        }))
        .await;

    response.assert_status(axum::http::StatusCode::ACCEPTED);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["providerId"], provider.id);
    assert_eq!(json["userId"], user.id);
    assert_eq!(json["ratingValue"], 4);
    assert!(json.get("createdAt").is_some());

    assert_eq!(p.staging.outstanding().await.unwrap(), 1);
}

#[tokio::test]
async fn test_submit_rating_does_not_touch_average() {
    let p = common::pipeline(5).await;
    let provider = p.provider("Acme Plumbing").await;
    let user = p.user("alice").await;
    let server = make_server(&p);
    p.cache
        .set(&average_rating_key(provider.id), "2.5", Some(60))
        .await
        .unwrap();

    server
        .post("/api/ratings")
        .json(&json!({ "providerId": provider.id, "userId": user.id, "ratingValue": 5 }))
        .await
        .assert_status(axum::http::StatusCode::ACCEPTED);

    let row = p.provider_row(provider.id).await;
    assert_eq!(row.rating_count, 0);
    assert!(!p.cache.contains(&average_rating_key(provider.id)));
}

#[tokio::test]
async fn test_submit_rating_out_of_range() {
    let p = common::pipeline(5).await;
    let provider = p.provider("Acme Plumbing").await;
    let user = p.user("alice").await;
    let server = make_server(&p);

    for value in [0, 6] {
        let response = server
            .post("/api/ratings")
            .json(&json!({ "providerId": provider.id, "userId": user.id, "ratingValue": value }))
            .await;

        response.assert_status_bad_request();
        let json = response.json::<serde_json::Value>();
        assert_eq!(json["error"]["code"], "validation_error");
    }

    assert_eq!(p.staging.outstanding().await.unwrap(), 0);
}

#[tokio::test]
async fn test_submit_rating_unknown_user() {
    let p = common::pipeline(5).await;
    let provider = p.provider("Acme Plumbing").await;
    let server = make_server(&p);

    let response = server
        .post("/api/ratings")
        .json(&json!({ "providerId": provider.id, "userId": 9999, "ratingValue": 3 }))
        .await;

    response.assert_status_not_found();
    assert_eq!(p.staging.outstanding().await.unwrap(), 0);
}

#[tokio::test]
async fn test_submit_rating_missing_field() {
    let p = common::pipeline(5).await;
    let server = make_server(&p);

    let response = server
        .post("/api/ratings")
        .json(&json!({ "providerId": 1, "ratingValue": 3 }))
        .await;

    assert!(response.status_code().is_client_error());
}
