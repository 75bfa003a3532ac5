mod helpers;

use axum::http::{header, Method, StatusCode};
use helpers::*;
use serde_json::json;

#[tokio::test]
async fn test_api_requires_auth() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());

    let response = send(&app, Method::GET, "/api/templates", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.json()["error"], "Unauthorized");

    let response = send(&app, Method::GET, "/api/templates", Some("forged.token"), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_login_sets_cookie_and_wrong_password_is_rejected() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "password": "wrong" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert!(response.headers.get(header::SET_COOKIE).is_none());

    let token = login(&app).await;
    let response = send(&app, Method::GET, "/api/templates", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_login_throttled_after_repeated_failures() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());

    for _ in 0..5 {
        let response = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "password": "guess" })),
        )
        .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while throttled
    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_template_crud_flow() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());
    let token = login(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/templates",
        Some(&token),
        Some(json!({
            "name": "  Report  ",
            "content": "Patient {patientName} presents with {complaint}.",
            "variables": [
                { "name": "patientName", "type": "text", "placeholder": "Surname" },
                { "name": "complaint", "type": "text" },
                { "name": " ", "type": "text" }
            ]
        })),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    assert_eq!(created["name"], "Report");
    assert_eq!(created["variables"].as_array().unwrap().len(), 2);
    let id = created["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        Method::GET,
        &format!("/api/templates/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["variables"][0]["placeholder"], "Surname");

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/templates/{}", id),
        Some(&token),
        Some(json!({ "name": "Report v2", "content": "Plain body" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["name"], "Report v2");
    assert_eq!(response.json()["variables"], json!([]));

    let response = send(&app, Method::GET, "/api/templates?q=v2", Some(&token), None).await;
    assert_eq!(response.json().as_array().unwrap().len(), 1);

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/templates/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "success": true }));

    let response = send(
        &app,
        Method::GET,
        &format!("/api/templates/{}", id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json()["error"], "Template not found");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_create_validation_error() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());
    let token = login(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/templates",
        Some(&token),
        Some(json!({ "name": "No body", "content": "   " })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "Name and content are required");

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_stateless_render_endpoint() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());
    let token = login(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/templates",
        Some(&token),
        Some(json!({
            "name": "Severity",
            "content": "Condition is {severity}. Cost: {price$}.",
            "variables": [
                { "name": "severity", "type": "select", "options": ["mild", "severe"] },
                { "name": "price$", "type": "text" }
            ]
        })),
    )
    .await;
    let id = response.json()["id"].as_str().unwrap().to_string();

    let response = send(
        &app,
        Method::POST,
        &format!("/api/templates/{}/render", id),
        Some(&token),
        Some(json!({ "bindings": [{ "name": "price$", "value": "$5" }] })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["content"], "Condition is {severity}. Cost: $5.");
    assert_eq!(body["substitutions"], 1);
    assert_eq!(body["unresolved"], json!(["severity"]));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());
    let token = login(&app).await;

    let response = send(&app, Method::POST, "/api/auth/logout", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(cookie.starts_with("auth-token=;"));
    assert!(cookie.contains("Max-Age=0"));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_health_and_page_redirects() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());

    let response = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "OK");

    let response = send(&app, Method::GET, "/dashboard", None, None).await;
    assert!(response.status.is_redirection());
    assert_eq!(response.headers.get(header::LOCATION).unwrap(), "/login");

    let response = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(response.headers.get(header::LOCATION).unwrap(), "/login");

    let token = login(&app).await;
    let response = send(&app, Method::GET, "/", Some(&token), None).await;
    assert_eq!(response.headers.get(header::LOCATION).unwrap(), "/dashboard");

    let response = send(&app, Method::GET, "/dashboard", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response
        .body
        .contains("Select a template from the list or create a new one"));

    teardown_test_db(test_db).await;
}

#[tokio::test]
async fn test_detect_placeholders() {
    let test_db = setup_test_db().await;
    let app = test_app(test_db.database());
    let token = login(&app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/placeholders",
        Some(&token),
        Some(json!({ "content": "{b} then {a}, again {b}; not { spaced}" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["placeholders"], json!(["b", "a"]));

    teardown_test_db(test_db).await;
}
