mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

async fn ask(app: &TestApp, farmer_id: &str, message: &str) {
    let (status, body) = app
        .post_json(
            "/voice/chat",
            json!({ "message": message, "farmer_id": farmer_id, "language": "en-IN" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "body: {body}");
    assert_eq!(body["saved"], true);
}

#[tokio::test]
async fn farmer_history_is_most_recent_first() {
    let app = TestApp::new();
    ask(&app, "f1", "What is the best time to sow wheat?").await;
    ask(&app, "f2", "Which fertilizer for maize?").await;
    ask(&app, "f1", "How much water does rice need?").await;

    let (status, body) = app.get_json("/voice/history/f1").await;
    assert_eq!(status, StatusCode::OK);

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["question"], "How much water does rice need?");
    assert_eq!(
        records[0]["answer"],
        "[en-IN] answer to: How much water does rice need?"
    );
    assert_eq!(records[1]["question"], "What is the best time to sow wheat?");
    assert!(records
        .iter()
        .all(|r| r["farmer_id"] == "f1" && r["language"] == "en-IN"));
    let newest = records[0]["created_at"].as_str().unwrap();
    let older = records[1]["created_at"].as_str().unwrap();
    assert!(newest >= older);
    assert!(records[0]["id"].as_i64().unwrap() > records[1]["id"].as_i64().unwrap());
}

#[tokio::test]
async fn unknown_farmer_has_empty_history() {
    let app = TestApp::new();
    ask(&app, "f1", "Soil test kab karein?").await;

    let (status, body) = app.get_json("/voice/history/nobody").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn all_history_pages_across_farmers() {
    let app = TestApp::new();
    ask(&app, "f1", "first").await;
    ask(&app, "f2", "second").await;
    ask(&app, "f3", "third").await;

    let (status, body) = app.get_json("/voice/history").await;
    assert_eq!(status, StatusCode::OK);
    let questions: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["question"].as_str().unwrap())
        .collect();
    assert_eq!(questions, vec!["third", "second", "first"]);

    let (status, body) = app.get_json("/voice/history?skip=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let page = body.as_array().unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0]["question"], "second");

    let (_, body) = app.get_json("/voice/history?skip=10").await;
    assert_eq!(body, json!([]));

    let (status, body) = app.get_json("/voice/history?limit=5000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn negative_pagination_is_rejected() {
    let app = TestApp::new();

    for uri in ["/voice/history?skip=-1", "/voice/history?limit=-5"] {
        let (status, body) = app.get_json(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "invalid_input");
    }
}

#[tokio::test]
async fn non_numeric_pagination_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app.get_json("/voice/history?limit=ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn history_read_without_schema_is_internal_error() {
    let app = TestApp::builder().without_schema().build();

    let (status, body) = app.get_json("/voice/history/f1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "internal_error");
}
