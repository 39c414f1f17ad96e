mod common;

use axum::http::{Method, StatusCode};

use common::app::spawn_test_app;
use common::auth::new_learner;
use common::http::{assert_json_error, call};

#[tokio::test]
async fn it_complete_item_records_progress_and_review() {
    let app = spawn_test_app().await;
    let (user_id, auth) = new_learner(&app);

    for item in ["uno", "dos", "uno"] {
        let (status, body) = call(
            &app.app,
            Method::POST,
            "/api/progress",
            Some(serde_json::json!({ "lessonId": 3, "itemId": item })),
            &auth,
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }

    let (status, body) = call(&app.app, Method::GET, "/api/progress/3", None, &auth).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lessonId"], 3);
    assert_eq!(body["data"]["completedItems"], serde_json::json!(["uno", "dos"]));

    let review = app.store.get_review(&user_id, "dos").unwrap().unwrap();
    assert_eq!(review.lesson_id, 3);
    assert_eq!(review.repetitions, 0);
}

#[tokio::test]
async fn it_lists_progress_by_lesson() {
    let app = spawn_test_app().await;
    let (_, auth) = new_learner(&app);

    for (lesson_id, item) in [(10, "diez"), (2, "dos"), (10, "once")] {
        call(
            &app.app,
            Method::POST,
            "/api/progress",
            Some(serde_json::json!({ "lessonId": lesson_id, "itemId": item })),
            &auth,
        )
        .await;
    }

    let (status, body) = call(&app.app, Method::GET, "/api/progress", None, &auth).await;
    assert_eq!(status, StatusCode::OK);
    let lessons: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["lessonId"].as_i64().unwrap())
        .collect();
    assert_eq!(lessons, vec![2, 10]);
}

#[tokio::test]
async fn it_unknown_lesson_is_empty() {
    let app = spawn_test_app().await;
    let (user_id, auth) = new_learner(&app);

    let (status, body) = call(&app.app, Method::GET, "/api/progress/42", None, &auth).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], user_id.as_str());
    assert_eq!(body["data"]["completedItems"], serde_json::json!([]));
}

#[tokio::test]
async fn it_rejects_bad_lesson_ids() {
    let app = spawn_test_app().await;
    let (_, auth) = new_learner(&app);

    let (status, body) = call(&app.app, Method::GET, "/api/progress/abc", None, &auth).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_ARGUMENT");

    let (status, body) = call(
        &app.app,
        Method::POST,
        "/api/progress",
        Some(serde_json::json!({ "lessonId": 0, "itemId": "x" })),
        &auth,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_ARGUMENT");

    let (status, body) = call(
        &app.app,
        Method::POST,
        "/api/progress",
        Some(serde_json::json!({ "lessonId": "one", "itemId": "x" })),
        &auth,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_json_error(&body, "INVALID_REQUEST_BODY");
}

#[tokio::test]
async fn it_uncomplete_removes_item_and_review() {
    let app = spawn_test_app().await;
    let (user_id, auth) = new_learner(&app);
    call(
        &app.app,
        Method::POST,
        "/api/progress",
        Some(serde_json::json!({ "lessonId": 1, "itemId": "sol" })),
        &auth,
    )
    .await;

    let (status, body) = call(
        &app.app,
        Method::DELETE,
        "/api/progress/1/items/sol",
        None,
        &auth,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["completedItems"], serde_json::json!([]));
    assert!(app.store.get_review(&user_id, "sol").unwrap().is_none());
}
