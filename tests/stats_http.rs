mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};

use common::app::spawn_test_app;
use common::auth::new_learner;
use common::fixtures::seed_review;
use common::http::call;

#[tokio::test]
async fn it_new_learner_has_zeroed_stats() {
    let app = spawn_test_app().await;
    let (_, auth) = new_learner(&app);

    let (status, body) = call(&app.app, Method::GET, "/api/stats", None, &auth).await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["data"];
    assert_eq!(stats["totalLearned"], 0);
    assert_eq!(stats["dueToday"], 0);
    assert_eq!(stats["reviewsDoneToday"], 0);
    assert_eq!(stats["streak"], 0);
    assert!(stats["lastReviewDate"].is_null());
    assert_eq!(stats["perLessonDue"], serde_json::json!([]));
}

#[tokio::test]
async fn it_stats_reflect_learning_and_reviews() {
    let app = spawn_test_app().await;
    let (user_id, auth) = new_learner(&app);

    for (lesson_id, item) in [(1, "a"), (1, "b"), (2, "c")] {
        call(
            &app.app,
            Method::POST,
            "/api/progress",
            Some(serde_json::json!({ "lessonId": lesson_id, "itemId": item })),
            &auth,
        )
        .await;
    }
    // same item learned in a second lesson counts once
    call(
        &app.app,
        Method::POST,
        "/api/progress",
        Some(serde_json::json!({ "lessonId": 2, "itemId": "a" })),
        &auth,
    )
    .await;
    seed_review(&app.store, &user_id, "old", 3, (4, 30, 2.5), Utc::now() + Duration::days(9));

    let (status, _) = call(
        &app.app,
        Method::POST,
        "/api/reviews",
        Some(serde_json::json!({ "itemId": "c", "grade": 5 })),
        &auth,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app.app, Method::GET, "/api/stats", None, &auth).await;
    let stats = &body["data"];
    assert_eq!(stats["totalLearned"], 3);
    assert_eq!(stats["dueToday"], 2);
    assert_eq!(stats["streak"], 1);
    assert_eq!(
        stats["lastReviewDate"],
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    );
    assert_eq!(
        stats["perLessonDue"],
        serde_json::json!([{ "lessonId": 1, "dueCount": 2 }])
    );
}
