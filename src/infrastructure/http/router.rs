use crate::infrastructure::http::controllers;
use crate::infrastructure::http::middleware::{require_auth, web_auth_middleware, AppState};
use crate::infrastructure::web;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Template bodies are capped well below this.
const MAX_BODY_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Build protected routes (require authentication)
    let protected = Router::new()
        .route("/api/auth/logout", post(controllers::auth::logout))
        .route(
            "/api/templates",
            get(controllers::templates::list_templates)
                .post(controllers::templates::create_template),
        )
        .route(
            "/api/templates/:id",
            get(controllers::templates::get_template)
                .put(controllers::templates::update_template)
                .delete(controllers::templates::delete_template),
        )
        .route(
            "/api/templates/:id/render",
            post(controllers::templates::render_template),
        )
        .route(
            "/api/placeholders",
            post(controllers::templates::detect_placeholders),
        )
        // Editor sessions
        .route(
            "/api/editor/sessions",
            post(controllers::editor::open_session),
        )
        .route(
            "/api/editor/sessions/:session_id",
            get(controllers::editor::get_session).delete(controllers::editor::close_session),
        )
        .route(
            "/api/editor/sessions/:session_id/bindings/:index",
            put(controllers::editor::change_binding),
        )
        .route(
            "/api/editor/sessions/:session_id/output",
            put(controllers::editor::direct_edit),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    // Build web routes (require auth via cookie)
    let web_protected = Router::new()
        .route("/dashboard", get(web::show_dashboard))
        .route("/dashboard/search", get(web::search_templates))
        .route(
            "/dashboard/templates/:id",
            get(web::show_template_editor).delete(web::delete_template),
        )
        .route(
            "/dashboard/sessions/:session_id/bindings/:index",
            put(web::change_binding),
        )
        .route(
            "/dashboard/sessions/:session_id/output",
            put(web::direct_edit),
        )
        .route("/templates/new", get(web::show_create_template_page))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            web_auth_middleware,
        ));

    // Build public routes
    Router::new()
        .route("/", get(web::root_redirect))
        .route("/health", get(health_handler))
        .route("/login", get(web::show_login_page).post(web::handle_login))
        .route("/logout", get(web::handle_logout).post(web::handle_logout))
        .route("/api/auth/login", post(controllers::auth::login))
        .merge(protected)
        .merge(web_protected)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}
