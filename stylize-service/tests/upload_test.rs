//! `POST /api/upload-image` against mock image hosts.

mod common;

use common::TestApp;
use serde_json::{json, Value};
use stylize_service::config::ImageHostKind;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// "hello" as standard base64
const PNG_BASE64: &str = "aGVsbG8=";

#[tokio::test]
async fn catbox_upload_returns_hosted_url() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/user/api.php"))
        .and(body_string_contains("fileupload"))
        .and(body_string_contains("fileToUpload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("https://files.catbox.moe/abc123.png\n"))
        .expect(1)
        .mount(&app.image_host)
        .await;

    let response = app
        .post_json(
            "/api/upload-image",
            &json!({ "imageBase64": format!("data:image/png;base64,{}", PNG_BASE64) }),
        )
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["imageUrl"], "https://files.catbox.moe/abc123.png");
}

#[tokio::test]
async fn catbox_error_text_is_reported() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/user/api.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("File type not allowed"))
        .mount(&app.image_host)
        .await;

    let response = app
        .post_json("/api/upload-image", &json!({ "imageBase64": PNG_BASE64 }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Catbox upload failed");
    assert_eq!(body["details"], "File type not allowed");
}

#[tokio::test]
async fn imgbb_upload_returns_hosted_url() {
    let app = TestApp::spawn_with_host(ImageHostKind::Imgbb).await;

    Mock::given(method("POST"))
        .and(path("/1/upload"))
        .and(query_param("key", "test-imgbb-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": 200,
            "data": { "url": "https://i.ibb.co/xyz/image.png" }
        })))
        .expect(1)
        .mount(&app.image_host)
        .await;

    let response = app
        .post_json("/api/upload-image", &json!({ "imageBase64": PNG_BASE64 }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["imageUrl"], "https://i.ibb.co/xyz/image.png");
}

#[tokio::test]
async fn imgbb_failure_carries_host_message() {
    let app = TestApp::spawn_with_host(ImageHostKind::Imgbb).await;

    Mock::given(method("POST"))
        .and(path("/1/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "status_code": 400,
            "error": { "message": "Invalid API v1 key." }
        })))
        .mount(&app.image_host)
        .await;

    let response = app
        .post_json("/api/upload-image", &json!({ "imageBase64": PNG_BASE64 }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ImgBB upload failed");
    assert_eq!(body["details"], "Invalid API v1 key.");
}

#[tokio::test]
async fn missing_image_is_rejected() {
    let app = TestApp::spawn().await;

    for body in [json!({}), json!({ "imageBase64": "" })] {
        let response = app.post_json("/api/upload-image", &body).await;
        assert_eq!(response.status().as_u16(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Missing imageBase64");
    }

    assert!(app.image_host.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn undecodable_image_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/api/upload-image", &json!({ "imageBase64": "!!!not-base64!!!" }))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid imageBase64");
    assert!(app.image_host.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_rejects_get() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/api/upload-image"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 405);
}

#[tokio::test]
async fn imgbb_sends_base64_form_field() {
    let app = TestApp::spawn_with_host(ImageHostKind::Imgbb).await;

    Mock::given(method("POST"))
        .and(path("/1/upload"))
        .and(body_string_contains("image=aGVsbG8%3D"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "url": "https://i.ibb.co/abc/image.png" }
        })))
        .expect(1)
        .mount(&app.image_host)
        .await;

    let response = app
        .post_json("/api/upload-image", &json!({ "imageBase64": PNG_BASE64 }))
        .await;

    assert_eq!(response.status().as_u16(), 200);
}
