#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use course_api::api::router;
use course_api::config::AppConfig;
use course_api::db::{self, SqliteCourseRepository};
use course_api::services::CourseService;
use course_api::state::AppState;

pub const TOKEN: &str = "test-token";

pub fn test_config(default_limit: &str) -> AppConfig {
    AppConfig::from_lookup(|key| match key {
        "TOKEN" => Some(TOKEN.to_string()),
        "PAGINATOR_LIMIT_DEFAULT" => Some(default_limit.to_string()),
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

/// Full router over a fresh in-memory database.
pub async fn build_test_app(default_limit: &str) -> Router {
    let config = test_config(default_limit);

    let pool = db::connect(&config.database_url, 1)
        .await
        .expect("Failed to create test db");
    db::migrate(&pool).await.expect("Failed to run migrations");

    let repo = SqliteCourseRepository::new(pool, Duration::from_secs(5));
    let state = AppState {
        service: CourseService::new(Arc::new(repo)),
        config: Arc::new(config),
    };

    router(state)
}

/// Sends an authorized request and returns the status and JSON body.
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_token(app, method, uri, body, Some(TOKEN)).await
}

pub async fn send_with_token(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn create_course(app: &Router, name: &str, start_date: &str, end_date: &str) -> Value {
    let (status, json) = send(
        app,
        "POST",
        "/courses",
        Some(serde_json::json!({
            "name": name,
            "start_date": start_date,
            "end_date": end_date,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json["data"].clone()
}
