//! Integration test: Server endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{reference_applicant, train_into};
use credit_risk::artifacts::ArtifactPaths;
use credit_risk::server::{create_router, AppState, ServerConfig};
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn test_app(artifacts_dir: &Path) -> axum::Router {
    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        artifacts: ArtifactPaths::in_dir(artifacts_dir),
        cache_artifacts: false,
    };
    let state = Arc::new(AppState::new(config));
    create_router(state)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 64).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

const REFERENCE_FORM: &str = "age=30&sex=male&job=2&housing=own&saving_accounts=little\
&checking_account=moderate&credit_amount=5000&duration=12&purpose=car";

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempdir().unwrap();
    let response = test_app(dir.path())
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["artifacts_present"], false);
}

#[tokio::test]
async fn test_root_serves_html() {
    let dir = tempdir().unwrap();
    let response = test_app(dir.path())
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("/predictdata"));
}

#[tokio::test]
async fn test_form_page() {
    let dir = tempdir().unwrap();
    let response = test_app(dir.path())
        .oneshot(Request::builder().uri("/predictdata").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("name=\"checking_account\""));
}

#[tokio::test]
async fn test_form_post_returns_verdict() {
    let dir = tempdir().unwrap();
    train_into(dir.path());

    let response = test_app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predictdata")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(REFERENCE_FORM))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "This customer presents GOOD RISK");
}

#[tokio::test]
async fn test_json_predict() {
    let dir = tempdir().unwrap();
    train_into(dir.path());

    let body = serde_json::to_string(&reference_applicant()).unwrap();
    let response = test_app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["label"], "good risk");
    assert_eq!(json["verdict"], "This customer presents GOOD RISK");
    assert!(json["probability"].as_f64().unwrap() < 0.42902538161651166);
}

fn json_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_json_predict_accepts_numbers() {
    let dir = tempdir().unwrap();
    train_into(dir.path());

    let body = r#"{"age": 30, "sex": "male", "job": 2, "housing": "own",
        "saving_accounts": "little", "checking_account": "moderate",
        "credit_amount": 5000, "duration": 12, "purpose": "car"}"#;
    let response = test_app(dir.path()).oneshot(json_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["label"], "good risk");
}

#[tokio::test]
async fn test_json_missing_field_is_bad_request() {
    let dir = tempdir().unwrap();
    train_into(dir.path());

    let body = r#"{"age": 30, "sex": "male", "job": 2, "housing": "own",
        "credit_amount": 5000, "duration": 12}"#;
    let response = test_app(dir.path()).oneshot(json_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"], true);
    assert!(json["message"].as_str().unwrap().contains("purpose"));
}

#[tokio::test]
async fn test_malformed_form_is_bad_request() {
    let dir = tempdir().unwrap();
    let form = REFERENCE_FORM.replace("&purpose=car", "");
    let response = test_app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predictdata")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["error"], true);
}

#[tokio::test]
async fn test_invalid_input_is_bad_request() {
    let dir = tempdir().unwrap();
    train_into(dir.path());

    let form = REFERENCE_FORM.replace("sex=male", "sex=robot");
    let response = test_app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predictdata")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("robot"));
}

#[tokio::test]
async fn test_missing_artifacts_is_unavailable() {
    let dir = tempdir().unwrap();
    let response = test_app(dir.path())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predictdata")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(REFERENCE_FORM))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Paths and internals stay out of the response
    let body = body_string(response).await;
    assert!(!body.contains("model.json"));
}

#[tokio::test]
async fn test_unknown_route() {
    let dir = tempdir().unwrap();
    let response = test_app(dir.path())
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
