use crate::application::services::{IssuedToken, AUTH_COOKIE_NAME};
use crate::infrastructure::http::middleware::{
    ApiError, ApiResult, AppState, AuthenticatedOperator,
};
use axum::{
    extract::{Extension, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub expires_at: i64,
}

/// Key used to throttle login attempts: first hop of `X-Forwarded-For`,
/// or a shared bucket for direct connections.
pub fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("direct")
        .to_string()
}

pub fn session_cookie(issued: &IssuedToken) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        AUTH_COOKIE_NAME, issued.token, issued.max_age_secs
    )
}

pub fn cleared_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        AUTH_COOKIE_NAME
    )
}

/// Throttle, then check the password. Shared by the JSON and form logins.
pub async fn attempt_login(
    state: &AppState,
    headers: &HeaderMap,
    password: &str,
) -> ApiResult<IssuedToken> {
    let client = client_key(headers);

    if let Err(wait) = state.rate_limiter.check(&client).await {
        tracing::warn!(
            "Login throttled for {} ({}s remaining)",
            client,
            wait.as_secs()
        );
        return Err(ApiError::TooManyRequests(
            "Too many login attempts. Try again later.".to_string(),
        ));
    }

    match state.auth_service.login(password) {
        Ok(issued) => {
            state.rate_limiter.reset(&client).await;
            tracing::info!("Operator logged in from {}", client);
            Ok(issued)
        }
        Err(e) => {
            tracing::warn!("Failed login from {}", client);
            Err(e)
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Response> {
    let issued = attempt_login(&state, &headers, &request.password).await?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&issued))],
        Json(LoginResponse {
            success: true,
            expires_at: issued.expires_at,
        }),
    )
        .into_response())
}

pub async fn logout(Extension(operator): Extension<AuthenticatedOperator>) -> impl IntoResponse {
    tracing::info!("Operator token {} logged out", operator.claims.jti);
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_cookie())],
        Json(serde_json::json!({ "success": true })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_client_key_uses_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_key(&headers), "direct");

        headers.insert(
            "X-Forwarded-For",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_key(&headers), "203.0.113.7");
    }

    #[test]
    fn test_cookie_strings() {
        let issued = IssuedToken {
            token: "abc.def".to_string(),
            expires_at: 0,
            max_age_secs: 3600,
        };
        assert_eq!(
            session_cookie(&issued),
            "auth-token=abc.def; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
        assert!(cleared_cookie().starts_with("auth-token=;"));
        assert!(cleared_cookie().ends_with("Max-Age=0"));
    }
}
