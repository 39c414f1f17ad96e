mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::http::{assert_json_error, request, response_json};

#[tokio::test]
async fn it_health_live_and_ready() {
    let app = spawn_test_app().await;

    let live = request(&app.app, Method::GET, "/health/live", None, &[]).await;
    assert_eq!(live.status(), StatusCode::OK);

    let ready = request(&app.app, Method::GET, "/health/ready", None, &[]).await;
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn it_health_database_is_ok() {
    let app = spawn_test_app().await;

    let db = request(&app.app, Method::GET, "/health/database", None, &[]).await;
    let (status, _, body) = response_json(db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
}

#[tokio::test]
async fn it_echoes_valid_request_id() {
    let app = spawn_test_app().await;

    let resp = request(
        &app.app,
        Method::GET,
        "/health/live",
        None,
        &[("x-request-id", "trace-abc_123".to_string())],
    )
    .await;
    assert_eq!(resp.headers()["x-request-id"], "trace-abc_123");

    let resp = request(
        &app.app,
        Method::GET,
        "/health/live",
        None,
        &[("x-request-id", "bad id!".to_string())],
    )
    .await;
    assert_ne!(resp.headers()["x-request-id"], "bad id!");
}

#[tokio::test]
async fn it_unknown_route_is_json_404() {
    let app = spawn_test_app().await;

    let resp = request(&app.app, Method::GET, "/api/nope", None, &[]).await;
    let (status, _, body) = response_json(resp).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_json_error(&body, "NOT_FOUND");
}
