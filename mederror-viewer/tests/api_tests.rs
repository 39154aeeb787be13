//! Integration tests for mederror-viewer API endpoints
//!
//! Tests cover:
//! - Health and build info
//! - Taxonomy and annotation uploads (including rejected uploads)
//! - Record browsing with pagination and judgement filter
//! - Error reassignment and its effect on statistics
//! - JSON/CSV downloads

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use mederror_common::export::split_csv;
use mederror_viewer::{build_router, AppState};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method

const TAXONOMY: &str = "A:\n  x: d1\nB:\n  y: d2\n";

const RECORDS: &str = r#"{"annotations": [
    {"id": 1, "sentence": "Take 5mg, twice \"daily\"", "gold_label": "5 mg", "predicted_label": "50 mg",
     "_judgement": "FP", "comment": "dose", "errors": [{"category": "A", "type": "x"}]},
    {"id": 2, "sentence": "no issue", "_judgement": "FP", "errors": []},
    {"id": 3, "sentence": "missed", "_judgement": "FN", "errors": [{"category": "A", "type": "x"}]}
]}"#;

/// Test helper: router over a fresh session
fn setup_app() -> (Router, AppState) {
    let state = AppState::default();
    (build_router(state.clone()), state)
}

fn request(method: &str, uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn extract_text(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Should be UTF-8")
}

/// Test helper: app with both files already uploaded
async fn loaded_app() -> Router {
    let (app, _) = setup_app();

    let response = app
        .clone()
        .oneshot(request("POST", "/api/taxonomy?filename=errors.yaml", TAXONOMY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(request("POST", "/api/annotations?filename=run1.json", RECORDS))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    app
}

// =============================================================================
// Health / build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_app();

    let response = app.oneshot(request("GET", "/health", Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mederror-viewer");
    assert!(body["version"].is_string());
    assert_eq!(body["generation"], 0);
    assert!(body["taxonomy"].is_null());
    assert!(body["annotations"].is_null());
    assert_eq!(body["listeners"], 0);
}

#[tokio::test]
async fn test_health_reports_session_contents() {
    let (app, state) = setup_app();
    for (uri, body) in [
        ("/api/taxonomy?filename=errors.yaml", TAXONOMY),
        ("/api/annotations?filename=run1.json", RECORDS),
    ] {
        app.clone().oneshot(request("POST", uri, body)).await.unwrap();
    }
    let _rx = state.events.subscribe();

    let response = app.oneshot(request("GET", "/health", Body::empty())).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["generation"], 2);
    assert_eq!(body["taxonomy"]["filename"], "errors.yaml");
    assert_eq!(body["taxonomy"]["items"], 2);
    assert_eq!(body["taxonomy"]["generation"], 1);
    assert_eq!(body["annotations"]["filename"], "run1.json");
    assert_eq!(body["annotations"]["items"], 3);
    assert_eq!(body["listeners"], 1);
}

#[tokio::test]
async fn test_buildinfo_and_ui() {
    let (app, _) = setup_app();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/buildinfo", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());

    let response = app.clone().oneshot(request("GET", "/", Body::empty())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_text(response.into_body()).await.contains("/static/app.js"));

    let response = app
        .oneshot(request("GET", "/static/app.js", Body::empty()))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/javascript"
    );
}

// =============================================================================
// Uploads
// =============================================================================

#[tokio::test]
async fn test_taxonomy_upload_and_lookup() {
    let (app, _) = setup_app();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/taxonomy", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(request("POST", "/api/taxonomy?filename=errors.yaml", TAXONOMY))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["categories"], 2);
    assert_eq!(body["types"], 2);

    let response = app
        .oneshot(request("GET", "/api/taxonomy", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["filename"], "errors.yaml");
    assert_eq!(body["categories"][0]["name"], "A");
    assert_eq!(body["categories"][1]["types"][0]["name"], "y");
    assert_eq!(body["options"][1]["category"], "B");
    assert_eq!(body["options"][1]["type"], "y");
}

#[tokio::test]
async fn test_malformed_taxonomy_keeps_previous() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/api/taxonomy?filename=bad.yaml", "A: [unclosed"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());

    let response = app
        .oneshot(request("GET", "/api/taxonomy", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["filename"], "errors.yaml");
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_malformed_annotations_keep_previous() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/api/annotations", "{\"annotations\": [1, 2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(request("GET", "/api/stats/summary", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["record_count"], 3);
}

#[tokio::test]
async fn test_unreadable_uploads_get_json_errors() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(request("POST", "/api/taxonomy", vec![0xff_u8, 0xfe, b'A']))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("UTF-8"));

    let oversized = vec![b' '; mederror_viewer::MAX_BODY_BYTES + 1];
    let response = app
        .clone()
        .oneshot(request("POST", "/api/annotations", oversized))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());

    // Neither rejected upload replaced anything
    let response = app
        .oneshot(request("GET", "/api/stats/summary", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["record_count"], 3);
}

#[tokio::test]
async fn test_upload_emits_event() {
    let (app, state) = setup_app();
    let mut rx = state.events.subscribe();

    app.oneshot(request("POST", "/api/annotations?filename=run1.json", RECORDS))
        .await
        .unwrap();

    let event = rx.recv().await.unwrap();
    assert_eq!(event.event_type(), "AnnotationsLoaded");
    assert_eq!(state.session.read().await.annotations().unwrap().len(), 3);
}

#[tokio::test]
async fn test_clear_annotations() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(request("DELETE", "/api/annotations", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(request("GET", "/api/stats/summary", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Browsing and statistics
// =============================================================================

#[tokio::test]
async fn test_stats_without_annotations_is_not_found() {
    let (app, _) = setup_app();

    for uri in [
        "/api/stats/summary",
        "/api/stats/judgements",
        "/api/stats/errors",
        "/api/stats/agreement",
        "/api/annotations",
        "/api/export/json",
    ] {
        let response = app.clone().oneshot(request("GET", uri, Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body = extract_json(response.into_body()).await;
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_judgement_histogram() {
    let app = loaded_app().await;

    let response = app
        .oneshot(request("GET", "/api/stats/judgements", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["key"], "FP");
    assert_eq!(entries[0]["count"], 2);
    assert_eq!(entries[0]["kind"], "false_positive");
    assert_eq!(entries[1]["key"], "FN");
    assert_eq!(entries[1]["count"], 1);
    assert_eq!(entries[1]["kind"], "false_negative");
}

#[tokio::test]
async fn test_error_histogram_with_filter() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/stats/errors", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["category"], "A");
    assert_eq!(body[0]["total"], 2);
    assert_eq!(body[0]["types"][0]["key"], "x");
    assert_eq!(body[0]["types"][0]["count"], 2);

    let response = app
        .oneshot(request("GET", "/api/stats/errors?judgement=FN", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["total"], 1);
}

#[tokio::test]
async fn test_list_annotations_filter_and_page() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/annotations?judgement=FP&page=7", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_records"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 100);
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["schema"], "tagged");
    assert_eq!(body["records"][0]["id"], 1);
    assert_eq!(body["records"][1]["id"], 2);

    let response = app
        .oneshot(request("GET", "/api/stats/agreement", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["support"], 3);
}

// =============================================================================
// Editing
// =============================================================================

#[tokio::test]
async fn test_reassign_updates_histogram() {
    let app = loaded_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/annotations/1/errors/0",
            serde_json::json!({"type": "y"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["outcome"], "reassigned");
    assert_eq!(body["category"], "B");
    assert_eq!(body["record"]["errors"][0]["category"], "B");
    assert_eq!(body["record"]["errors"][0]["type"], "y");

    let response = app
        .oneshot(request("GET", "/api/stats/errors", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    // Record 1 now comes first with B:y, record 3 still has A:x
    assert_eq!(body[0]["category"], "B");
    assert_eq!(body[0]["types"][0]["key"], "y");
    assert_eq!(body[1]["category"], "A");
    assert_eq!(body[1]["total"], 1);
}

#[tokio::test]
async fn test_every_type_option_is_stored_as_listed() {
    let (app, _) = setup_app();
    let shared = "A:\n  x: d1\nB:\n  x: d3\n  y: d2\n";
    app.clone()
        .oneshot(request("POST", "/api/taxonomy", shared))
        .await
        .unwrap();
    app.clone()
        .oneshot(request("POST", "/api/annotations", RECORDS))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("GET", "/api/taxonomy", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let options = body["options"].as_array().unwrap().clone();
    // `x` is listed once, under A; B keeps only `y`
    assert_eq!(options.len(), 2);
    assert_eq!(body["categories"][1]["types"].as_array().unwrap().len(), 2);

    for option in options.iter().rev() {
        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                "/api/annotations/1/errors/0",
                serde_json::json!({"type": option["type"]}),
            ))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["record"]["errors"][0]["category"], option["category"]);
        assert_eq!(body["record"]["errors"][0]["type"], option["type"]);
    }
}

#[tokio::test]
async fn test_reassign_bad_target_is_silent() {
    let app = loaded_app().await;

    for uri in ["/api/annotations/1/errors/9", "/api/annotations/99/errors/0"] {
        let response = app
            .clone()
            .oneshot(json_request("PUT", uri, serde_json::json!({"type": "y"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["outcome"], "no_target");
        assert!(body["record"].is_null());
    }

    let response = app
        .oneshot(request("GET", "/api/stats/errors", Body::empty()))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body[0]["types"][0]["count"], 2);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_csv_download() {
    let app = loaded_app().await;

    let response = app
        .oneshot(request("GET", "/api/export/csv", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"run1_updated.csv\""
    );
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));

    let rows = split_csv(&extract_text(response.into_body()).await);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], "id");
    assert_eq!(rows[1][1], "Take 5mg, twice \"daily\"");
    assert_eq!(rows[1][6], "A: x");
}

#[tokio::test]
async fn test_export_json_mirrors_input() {
    let app = loaded_app().await;

    app.clone()
        .oneshot(json_request(
            "PUT",
            "/api/annotations/3/errors/0",
            serde_json::json!({"type": "y"}),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/api/export/json", Body::empty()))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"run1_updated.json\""
    );

    let body = extract_json(response.into_body()).await;
    let records = body["annotations"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["_judgement"], "FP");
    assert_eq!(records[0]["comment"], "dose");
    assert_eq!(records[2]["errors"][0]["category"], "B");
}

#[tokio::test]
async fn test_export_unknown_format() {
    let app = loaded_app().await;

    let response = app
        .oneshot(request("GET", "/api/export/xml", Body::empty()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
