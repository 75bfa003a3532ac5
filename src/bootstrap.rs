use crate::application::services::*;
use crate::config::Config;
use crate::domain::ports::editor_session_store::EditorSessionStore;
use crate::domain::ports::template_repository::TemplateRepository;
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::persistence::Database;
use crate::infrastructure::providers::InMemoryEditorSessionStore;
use std::sync::Arc;
use std::time::Duration;

/// How often idle editor sessions and spent login limiters are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Wire services together. Does not start background tasks.
pub fn build_app_state(db: Database, config: &Config) -> AppState {
    let template_repo: Arc<dyn TemplateRepository> = Arc::new(db);
    let template_service = TemplateService::new(template_repo);

    let sessions: Arc<dyn EditorSessionStore> = Arc::new(InMemoryEditorSessionStore::new());
    let editor_service = EditorService::new(
        template_service.clone(),
        sessions,
        Duration::from_secs(config.editor_session_ttl_minutes * 60),
    );

    if config.admin_password.is_none() {
        tracing::warn!("ADMIN_PASSWORD not set, falling back to the default password");
    }
    let admin_password = AdminPassword::from_config(config.admin_password.as_deref());
    let auth_service = AuthService::new(
        &config.auth_secret,
        admin_password,
        config.session_duration_hours,
    );
    tracing::info!(
        "Auth service initialized ({}h token lifetime)",
        config.session_duration_hours
    );

    AppState {
        template_service,
        editor_service,
        auth_service,
        rate_limiter: AuthRateLimiter::new(),
    }
}

/// Periodic cleanup of idle editor sessions and login limiters.
pub fn spawn_background_tasks(state: &AppState) {
    let editor_service = state.editor_service.clone();
    let rate_limiter = state.rate_limiter.clone();

    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(SWEEP_INTERVAL);
        tracing::info!(
            "Session sweep task started ({}s interval)",
            SWEEP_INTERVAL.as_secs()
        );

        loop {
            sweep.tick().await;

            let evicted = editor_service.evict_idle().await;
            if evicted > 0 {
                tracing::info!(
                    "Evicted {} idle editor sessions ({} still open)",
                    evicted,
                    editor_service.active_sessions().await
                );
            }

            rate_limiter.cleanup().await;
        }
    });
}
