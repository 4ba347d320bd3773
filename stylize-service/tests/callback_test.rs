//! `POST /api/kie-callback` updates the stored transformation.

mod common;

use common::TestApp;
use serde_json::{json, Value};
use stylize_service::models::TransformationStatus;

/// Submit a generation so a pending record for `task_id` exists.
async fn pending_task(app: &TestApp, task_id: &str) {
    app.seed_user("user-1", "STANDARD", Some(10)).await;
    app.mount_kie_task(task_id).await;

    let response = app
        .post_json(
            "/api/generate-image",
            &json!({ "userId": "user-1", "style": "anime" }),
        )
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn success_callback_completes_transformation() {
    let app = TestApp::spawn().await;
    pending_task(&app, "task-ok").await;

    let response = app
        .post_json(
            "/api/kie-callback",
            &json!({
                "code": 200,
                "msg": "success",
                "data": {
                    "taskId": "task-ok",
                    "state": "success",
                    "resultJson": "{\"resultUrls\":[\"https://cdn.test/out.png\"]}"
                }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);

    let record = app.store.transformation("task-ok").await.unwrap();
    assert_eq!(record.status, TransformationStatus::Completed);
    assert_eq!(record.result_urls, vec!["https://cdn.test/out.png".to_string()]);
    assert!(record.completed_at.is_some());
}

#[tokio::test]
async fn failed_callback_records_reason() {
    let app = TestApp::spawn().await;
    pending_task(&app, "task-bad").await;

    let response = app
        .post_json(
            "/api/kie-callback",
            &json!({
                "code": 501,
                "msg": "Generation failed",
                "data": { "taskId": "task-bad", "state": "fail", "failMsg": "content policy" }
            }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);

    let record = app.store.transformation("task-bad").await.unwrap();
    assert_eq!(record.status, TransformationStatus::Failed);
    assert_eq!(record.error_message.as_deref(), Some("content policy"));
    assert!(record.result_urls.is_empty());
}

#[tokio::test]
async fn intermediate_state_leaves_record_pending() {
    let app = TestApp::spawn().await;
    pending_task(&app, "task-wait").await;

    let response = app
        .post_json(
            "/api/kie-callback",
            &json!({ "code": 200, "data": { "taskId": "task-wait", "state": "generating" } }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let record = app.store.transformation("task-wait").await.unwrap();
    assert_eq!(record.status, TransformationStatus::Pending);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json(
            "/api/kie-callback",
            &json!({ "code": 200, "data": { "taskId": "nope", "state": "success" } }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Transformation not found");
}

#[tokio::test]
async fn missing_task_id_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/api/kie-callback", &json!({ "code": 200, "data": {} }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
}
