//! HTTP route tests for the submission board
//!
//! Requests go through the full router (body limit, CORS and trace layers)
//! without binding a socket.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;
use weekly_challenge::{router, ChallengeConfig, Competition};

const BOUNDARY: &str = "XBOUNDARYX";

// ============================================================================
// TEST HELPERS
// ============================================================================

fn app(max_upload_bytes: usize) -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    let mut config = ChallengeConfig::from_toml_str(
        r#"
        [round]
        name = "week-9"
        scoring_strategy = "weighted_f1"
        reference_values = [0, 1, 1, 0]

        [links]
        train = "https://example.com/train.csv"
    "#,
    )
    .unwrap();
    config.storage.path = dir.path().to_path_buf();
    let competition = Arc::new(Competition::open(&config).unwrap());
    (router(competition, max_upload_bytes), dir)
}

fn multipart_body(name: Option<&str>, file: Option<&str>) -> String {
    let mut body = String::new();
    if let Some(name) = name {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n"
        ));
    }
    if let Some(file) = file {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"predictions.csv\"\r\nContent-Type: text/csv\r\n\r\n{file}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

fn submit_request(name: Option<&str>, file: Option<&str>) -> Request<Body> {
    let body = multipart_body(name, file);
    Request::builder()
        .method("POST")
        .uri("/submit")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// ROUND
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (app, _dir) = app(1024 * 1024);
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_round_info_is_public_safe() {
    let (app, _dir) = app(1024 * 1024);
    let response = app.oneshot(get("/round")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let info = json_body(response).await;
    assert_eq!(info["name"], "week-9");
    assert_eq!(info["metric"], "weighted_f1");
    assert_eq!(info["required_length"], 4);
    assert_eq!(info["links"]["train"], "https://example.com/train.csv");
    assert!(info.get("reference_values").is_none());
}

#[tokio::test]
async fn test_example_submission_download() {
    let (app, _dir) = app(1024 * 1024);
    let response = app.oneshot(get("/example_submission.csv")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"index,target\n0,0\n1,0\n2,0\n3,0\n");
}

// ============================================================================
// SUBMIT
// ============================================================================

#[tokio::test]
async fn test_submit_accepts_valid_file() {
    let (app, _dir) = app(1024 * 1024);
    let response = app
        .oneshot(submit_request(
            Some("Noura"),
            Some("index,target\n0,0\n1,1\n2,1\n3,0\n"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Noura");
    assert_eq!(body["score"], 1.0);
    assert_eq!(body["score_display"], "1.0000");
    assert!(body["error"].is_null());
}

#[tokio::test]
async fn test_submit_validation_error_is_422() {
    let (app, dir) = app(1024 * 1024);
    let response = app
        .oneshot(submit_request(
            Some("Noura"),
            Some("id,label\n0,0\n1,1\n2,1\n3,0\n"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("'index' and 'target'"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_submit_missing_fields_is_400() {
    let (app, _dir) = app(1024 * 1024);
    let response = app
        .clone()
        .oneshot(submit_request(None, Some("index,target\n0,0\n")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(submit_request(Some("Noura"), None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("file"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let (app, dir) = app(64);
    let rows: String = (0..100).map(|i| format!("{},0\n", i)).collect();
    let response = app
        .oneshot(submit_request(
            Some("Noura"),
            Some(&format!("index,target\n{}", rows)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ============================================================================
// LEADERBOARD AND EXPORT
// ============================================================================

#[tokio::test]
async fn test_empty_leaderboard() {
    let (app, _dir) = app(1024 * 1024);
    let response = app.oneshot(get("/leaderboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["entries"].as_array().unwrap().len(), 0);
    assert!(body["top_scorer"].is_null());
    assert!(body["notice"].is_null());
}

#[tokio::test]
async fn test_leaderboard_after_submissions() {
    let (app, _dir) = app(1024 * 1024);
    let files = [
        ("Noura", "index,target\n0,1\n1,1\n2,1\n3,1\n"),
        ("Turki", "index,target\n0,0\n1,1\n2,1\n3,0\n"),
        ("Noura", "index,target\n0,0\n1,1\n2,0\n3,0\n"),
        ("Majed", "index,target\n0,1\n1,0\n2,0\n3,1\n"),
    ];
    for (name, file) in files {
        let response = app
            .clone()
            .oneshot(submit_request(Some(name), Some(file)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let body = json_body(app.clone().oneshot(get("/leaderboard")).await.unwrap()).await;
    let entries = body["entries"].as_array().unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Turki", "Noura", "Majed"]);
    assert_eq!(entries[1]["entries"], 2);
    assert_eq!(body["top_scorer"]["name"], "Turki");
    assert_eq!(body["summary"]["participants"], 3);
    assert_eq!(body["summary"]["submissions"], 4);

    let top = json_body(
        app.clone()
            .oneshot(get("/leaderboard/top?n=2"))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(top["entries"].as_array().unwrap().len(), 2);

    let default_top = json_body(app.oneshot(get("/leaderboard/top")).await.unwrap()).await;
    assert_eq!(default_top["entries"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_submissions_zip() {
    let (app, _dir) = app(1024 * 1024);
    app.clone()
        .oneshot(submit_request(
            Some("Noura"),
            Some("index,target\n0,0\n1,1\n2,1\n3,0\n"),
        ))
        .await
        .unwrap();

    let response = app.oneshot(get("/submissions.zip")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("submissions.zip"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    assert_eq!(archive.len(), 1);
}
