//! End-to-end tests driving the router in-process.

use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use serde_json::{Value, json};
use tower::ServiceExt;

use chirpy_serve::{AppState, Config, Database, router};

fn test_state(platform: &str, filepath_root: &Path) -> AppState {
    let config = Config {
        bind_addr: "127.0.0.1:0".to_string(),
        db_path: ":memory:".into(),
        platform: platform.to_string(),
        filepath_root: filepath_root.to_path_buf(),
        metrics_port: None,
    };
    AppState::with_database(config, Database::open_in_memory().unwrap())
}

fn dev_app() -> (AppState, Router) {
    let state = test_state("dev", Path::new("."));
    let app = router(state.clone());
    (state, app)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// POST `body` as-is, with no `Content-Type` header.
async fn post_raw(app: &Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

async fn create_user(app: &Router, email: &str) -> Value {
    let response = send(app, Method::POST, "/api/users", Some(json!({ "email": email }))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ═══════════════════════════════════════════════════════════════════════════
// Health
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn healthz_returns_ok_text() {
    let (_, app) = dev_app();
    let response = send(&app, Method::GET, "/api/healthz", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_text(response).await, "OK");
}

// ═══════════════════════════════════════════════════════════════════════════
// Validate chirp
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn validate_chirp_cleans_body() {
    let (_, app) = dev_app();
    let response = send(
        &app,
        Method::POST,
        "/api/validate_chirp",
        Some(json!({ "body": "This is a kerfuffle opinion I need to share with the world" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "cleaned_body": "This is a **** opinion I need to share with the world" })
    );
}

#[tokio::test]
async fn validate_chirp_too_long() {
    let (_, app) = dev_app();
    let response = send(
        &app,
        Method::POST,
        "/api/validate_chirp",
        Some(json!({ "body": "x".repeat(141) })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Chirp is too long" })
    );
}

#[tokio::test]
async fn validate_chirp_malformed_json_is_internal_error() {
    let (_, app) = dev_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/validate_chirp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Couldn't decode parameters" })
    );
}

#[tokio::test]
async fn validate_chirp_without_content_type() {
    let (_, app) = dev_app();
    let response = post_raw(&app, "/api/validate_chirp", r#"{"body":"a kerfuffle"}"#).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "cleaned_body": "a ****" })
    );
}

#[tokio::test]
async fn validate_chirp_missing_body_is_empty() {
    let (_, app) = dev_app();
    let response = send(&app, Method::POST, "/api/validate_chirp", Some(json!({}))).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "cleaned_body": "" }));
}

#[tokio::test]
async fn validate_chirp_ignores_unknown_fields() {
    let (_, app) = dev_app();
    let response = send(
        &app,
        Method::POST,
        "/api/validate_chirp",
        Some(json!({ "body": "Sharbert here", "extra": 1 })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "cleaned_body": "**** here" })
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Users and chirps
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn create_user_returns_user() {
    let (_, app) = dev_app();
    let user = create_user(&app, "walt@breakingbad.com").await;

    assert_eq!(user["email"], "walt@breakingbad.com");
    assert!(user["id"].as_str().is_some());
    assert!(user["created_at"].as_str().is_some());
    assert!(user["updated_at"].as_str().is_some());
}

#[tokio::test]
async fn create_chirp_stores_cleaned_body() {
    let (_, app) = dev_app();
    let user = create_user(&app, "walt@breakingbad.com").await;

    let response = send(
        &app,
        Method::POST,
        "/api/chirps",
        Some(json!({ "body": "fornax sharbert kerfuffle", "user_id": user["id"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let chirp = body_json(response).await;
    assert_eq!(chirp["body"], "**** **** ****");
    assert_eq!(chirp["user_id"], user["id"]);
    for field in ["id", "created_at", "updated_at"] {
        assert!(chirp[field].as_str().is_some(), "missing {field}");
    }

    let uri = format!("/api/chirps/{}", chirp["id"].as_str().unwrap());
    let response = send(&app, Method::GET, &uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, chirp);
}

#[tokio::test]
async fn create_chirp_too_long_is_not_stored() {
    let (state, app) = dev_app();
    let user = create_user(&app, "walt@breakingbad.com").await;

    let response = send(
        &app,
        Method::POST,
        "/api/chirps",
        Some(json!({ "body": "a".repeat(141), "user_id": user["id"] })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(state.db.get_chirps().unwrap().is_empty());
}

#[tokio::test]
async fn create_chirp_unknown_user_fails() {
    let (_, app) = dev_app();
    let response = send(
        &app,
        Method::POST,
        "/api/chirps",
        Some(json!({ "body": "hello", "user_id": uuid::Uuid::new_v4() })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Couldn't insert chirp" })
    );
}

#[tokio::test]
async fn create_chirp_missing_user_id_fails_insert() {
    let (state, app) = dev_app();
    create_user(&app, "walt@breakingbad.com").await;

    let response = send(&app, Method::POST, "/api/chirps", Some(json!({ "body": "hi" }))).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Couldn't insert chirp" })
    );
    assert!(state.db.get_chirps().unwrap().is_empty());
}

#[tokio::test]
async fn create_chirp_without_content_type() {
    let (_, app) = dev_app();
    let user = create_user(&app, "walt@breakingbad.com").await;
    let payload = json!({ "body": "fornax", "user_id": user["id"] }).to_string();

    let response = post_raw(&app, "/api/chirps", &payload).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["body"], "****");
}

#[tokio::test]
async fn create_user_without_content_type() {
    let (_, app) = dev_app();
    let response = post_raw(&app, "/api/users", r#"{"email":"jesse@breakingbad.com"}"#).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["email"], "jesse@breakingbad.com");
}

#[tokio::test]
async fn create_chirp_invalid_user_id_is_decode_error() {
    let (_, app) = dev_app();
    let response = send(
        &app,
        Method::POST,
        "/api/chirps",
        Some(json!({ "body": "hello", "user_id": "not-a-uuid" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Couldn't decode parameters" })
    );
}

#[tokio::test]
async fn list_chirps_oldest_first() {
    let (_, app) = dev_app();
    let user = create_user(&app, "walt@breakingbad.com").await;

    for body in ["one", "two", "three"] {
        let response = send(
            &app,
            Method::POST,
            "/api/chirps",
            Some(json!({ "body": body, "user_id": user["id"] })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = send(&app, Method::GET, "/api/chirps", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let chirps = body_json(response).await;
    let bodies: Vec<&str> = chirps
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, ["one", "two", "three"]);
}

#[tokio::test]
async fn list_chirps_empty() {
    let (_, app) = dev_app();
    let response = send(&app, Method::GET, "/api/chirps", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn get_chirp_invalid_id() {
    let (_, app) = dev_app();
    let response = send(&app, Method::GET, "/api/chirps/not-a-uuid", None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await, json!({ "error": "Invalid ID" }));
}

#[tokio::test]
async fn get_chirp_not_found() {
    let (_, app) = dev_app();
    let uri = format!("/api/chirps/{}", uuid::Uuid::new_v4());
    let response = send(&app, Method::GET, &uri, None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        json!({ "error": "Chirp ID not found" })
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Static files and admin
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn app_serves_files_and_counts_hits() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

    let state = test_state("dev", dir.path());
    let app = router(state.clone());

    let response = send(&app, Method::GET, "/app/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "<h1>Welcome to Chirpy</h1>");

    let response = send(&app, Method::GET, "/app/missing.png", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(state.hits.get(), 2);
}

#[tokio::test]
async fn app_without_trailing_slash_redirects() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Welcome to Chirpy</h1>").unwrap();

    let state = test_state("dev", dir.path());
    let app = router(state.clone());

    let response = send(&app, Method::GET, "/app", None).await;
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(response.headers()[header::LOCATION], "/app/");

    let response = send(&app, Method::GET, "/app?v=2", None).await;
    assert_eq!(response.headers()[header::LOCATION], "/app/?v=2");

    // Redirects happen before the file server and are not hits
    assert_eq!(state.hits.get(), 0);

    let response = send(&app, Method::GET, "/app/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.hits.get(), 1);
}

#[tokio::test]
async fn api_requests_are_not_counted() {
    let (state, app) = dev_app();
    send(&app, Method::GET, "/api/healthz", None).await;
    send(&app, Method::GET, "/admin/metrics", None).await;
    assert_eq!(state.hits.get(), 0);
}

#[tokio::test]
async fn admin_metrics_reports_hits() {
    let (state, app) = dev_app();
    for _ in 0..3 {
        state.hits.increment();
    }

    let response = send(&app, Method::GET, "/admin/metrics", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert_eq!(
        body_text(response).await,
        "<html><body><h1>Welcome, Chirpy Admin</h1><p>Chirpy has been visited 3 times!</p></body></html>"
    );
}

#[tokio::test]
async fn admin_reset_clears_hits_and_data() {
    let (state, app) = dev_app();
    let user = create_user(&app, "walt@breakingbad.com").await;
    send(
        &app,
        Method::POST,
        "/api/chirps",
        Some(json!({ "body": "i am the one who knocks", "user_id": user["id"] })),
    )
    .await;
    state.hits.increment();

    let response = send(&app, Method::POST, "/admin/reset", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_text(response).await,
        "Hits reset to 0 and database reset to initial state."
    );

    assert_eq!(state.hits.get(), 0);
    assert!(state.db.get_chirps().unwrap().is_empty());

    // The email is free again after reset
    create_user(&app, "walt@breakingbad.com").await;
}

#[tokio::test]
async fn admin_reset_forbidden_outside_dev() {
    let state = test_state("prod", Path::new("."));
    let app = router(state.clone());
    state.hits.increment();

    let response = send(&app, Method::POST, "/admin/reset", None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(state.hits.get(), 1);
}
