use crate::application::services::auth_service::Claims;
use crate::application::services::{
    AuthRateLimiter, AuthService, EditorService, TemplateService, AUTH_COOKIE_NAME,
};
use crate::infrastructure::http::middleware::error::ApiError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

#[derive(Clone)]
pub struct AppState {
    pub template_service: TemplateService,
    pub editor_service: EditorService,
    pub auth_service: AuthService,
    pub rate_limiter: AuthRateLimiter,
}

/// The operator, as proven by a valid token.
#[derive(Clone, Debug)]
pub struct AuthenticatedOperator {
    pub claims: Claims,
}

/// Token from the `auth-token` cookie, else from `Authorization: Bearer`.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(AUTH_COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthenticatedOperator> {
    let token = extract_token(headers)?;
    match state.auth_service.verify_token(&token) {
        Ok(claims) => Some(AuthenticatedOperator { claims }),
        Err(e) => {
            tracing::debug!("Rejected token: {}", e);
            None
        }
    }
}

/// Guards JSON API routes; answers 401 when the token is missing or bad.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let operator = authenticate(&state, request.headers()).ok_or(ApiError::Unauthorized)?;
    request.extensions_mut().insert(operator);
    Ok(next.run(request).await)
}

/// Guards HTML pages; sends the browser to the login page instead of 401.
pub async fn web_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Some(_) => next.run(request).await,
        None => {
            if request.headers().contains_key("HX-Request") {
                ([("HX-Redirect", "/login")], "").into_response()
            } else {
                Redirect::to("/login").into_response()
            }
        }
    }
}

/// Whether the request already carries a valid token.
pub fn is_authenticated(state: &AppState, headers: &HeaderMap) -> bool {
    authenticate(state, headers).is_some()
}
