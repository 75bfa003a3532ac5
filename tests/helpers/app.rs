use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use medscribe::bootstrap::build_app_state;
use medscribe::config::Config;
use medscribe::infrastructure::http::middleware::AppState;
use medscribe::infrastructure::http::router::build_router;
use medscribe::infrastructure::persistence::Database;
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test-password";

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "AUTH_SECRET" => Some("integration-test-secret".to_string()),
        "ADMIN_PASSWORD" => Some(TEST_PASSWORD.to_string()),
        _ => None,
    })
    .expect("test config")
}

pub fn test_state(db: Database) -> AppState {
    build_app_state(db, &test_config())
}

pub fn test_app(db: Database) -> Router {
    build_router(test_state(db))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is JSON")
    }
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    dispatch(app, request).await
}

/// Send a form-encoded body the way HTMX does.
pub async fn send_form(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    form: &str,
) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(Body::from(form.to_string()))
        .unwrap();

    dispatch(app, request).await
}

async fn dispatch(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    TestResponse {
        status,
        headers,
        body: String::from_utf8_lossy(&bytes).into_owned(),
    }
}

/// Log in through the JSON endpoint and return the token from the cookie.
pub async fn login(app: &Router) -> String {
    let response = send(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({ "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    let cookie = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("login sets a cookie");
    cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("auth-token="))
        .expect("auth-token cookie")
        .to_string()
}
