mod common;

use axum::http::StatusCode;
use common::TestApp;

#[tokio::test]
async fn root_lists_endpoints() {
    let app = TestApp::new();

    let (status, body) = app.get_json("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["chat"], "POST /voice/chat");
    assert_eq!(body["endpoints"]["history"], "GET /voice/history/{farmer_id}");
}

#[tokio::test]
async fn health_reports_database_and_credentials() {
    let app = TestApp::builder().unconfigured_recognizer().build();

    let (status, body) = app.get_json("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["api_keys"]["google_stt"], false);
    assert_eq!(body["api_keys"]["google_tts"], true);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new();

    let (status, _) = app.get_json("/voice/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
