use crate::{
    application::services::TemplateService,
    domain::entities::VariableKind,
    domain::errors::DomainError,
    domain::ports::editor_session_store::{EditorSessionStore, SharedEditorState},
    domain::services::{EditorEvent, EditorState, OutputSource},
    infrastructure::http::middleware::error::{ApiError, ApiResult},
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// One variable control as the editing surface shows it.
#[derive(Debug, Clone, Serialize)]
pub struct BindingView {
    pub index: usize,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: VariableKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    pub hint: String,
    pub value: String,
}

/// Everything the editing surface needs after an event.
#[derive(Debug, Clone, Serialize)]
pub struct EditorSnapshot {
    pub session_id: String,
    pub template_id: String,
    pub bindings: Vec<BindingView>,
    pub output: String,
    pub source: OutputSource,
    /// Variables still without a value.
    pub unresolved: Vec<String>,
    pub revision: u64,
}

impl EditorSnapshot {
    fn capture(session_id: &str, state: &EditorState) -> Self {
        let bindings = state
            .definitions()
            .iter()
            .zip(state.bindings())
            .enumerate()
            .map(|(index, (definition, binding))| BindingView {
                index,
                name: definition.name.clone(),
                kind: definition.kind,
                options: definition.options.clone(),
                hint: definition.input_hint(),
                value: binding.value.clone(),
            })
            .collect();

        Self {
            session_id: session_id.to_string(),
            template_id: state.template_id().to_string(),
            bindings,
            output: state.output().to_string(),
            source: state.source(),
            unresolved: state
                .unresolved()
                .into_iter()
                .map(str::to_string)
                .collect(),
            revision: state.revision(),
        }
    }
}

/// Interactive fill-in sessions over stored templates.
#[derive(Clone)]
pub struct EditorService {
    template_service: TemplateService,
    sessions: Arc<dyn EditorSessionStore>,
    idle_ttl: Duration,
}

impl EditorService {
    pub fn new(
        template_service: TemplateService,
        sessions: Arc<dyn EditorSessionStore>,
        idle_ttl: Duration,
    ) -> Self {
        Self {
            template_service,
            sessions,
            idle_ttl,
        }
    }

    /// Start editing `template_id` with empty bindings. A previous session
    /// of the same surface is discarded.
    pub async fn open(
        &self,
        template_id: &str,
        previous_session_id: Option<&str>,
    ) -> ApiResult<EditorSnapshot> {
        if let Some(previous) = previous_session_id {
            if self.sessions.remove(previous).await {
                tracing::debug!("Editor session {} replaced", previous);
            }
        }

        let template = self.template_service.get_template(template_id).await?;
        let state = EditorState::new(&template);

        let session_id = uuid::Uuid::new_v4().to_string();
        let snapshot = EditorSnapshot::capture(&session_id, &state);
        self.sessions.insert(&session_id, state).await;

        tracing::debug!(
            "Editor session {} opened for template {}",
            session_id,
            template_id
        );
        Ok(snapshot)
    }

    pub async fn snapshot(&self, session_id: &str) -> ApiResult<EditorSnapshot> {
        let shared = self.session(session_id).await?;
        let state = shared.lock().await;
        Ok(EditorSnapshot::capture(session_id, &state))
    }

    pub async fn apply(&self, session_id: &str, event: EditorEvent) -> ApiResult<EditorSnapshot> {
        let shared = self.session(session_id).await?;
        let mut state = shared.lock().await;
        let rerenders = matches!(event, EditorEvent::BindingChanged { .. });

        state.apply(event).map_err(|e| {
            tracing::warn!("Editor session {}: {}", session_id, e);
            ApiError::from(DomainError::from(e))
        })?;

        if rerenders {
            metrics::counter!("template_renders_total").increment(1);
        }
        Ok(EditorSnapshot::capture(session_id, &state))
    }

    pub async fn change_binding(
        &self,
        session_id: &str,
        index: usize,
        value: String,
    ) -> ApiResult<EditorSnapshot> {
        self.apply(session_id, EditorEvent::BindingChanged { index, value })
            .await
    }

    pub async fn direct_edit(&self, session_id: &str, text: String) -> ApiResult<EditorSnapshot> {
        self.apply(session_id, EditorEvent::DirectEdit { text }).await
    }

    pub async fn close(&self, session_id: &str) -> ApiResult<()> {
        if self.sessions.remove(session_id).await {
            Ok(())
        } else {
            Err(ApiError::NotFound("Editor session not found".to_string()))
        }
    }

    pub async fn evict_idle(&self) -> usize {
        self.sessions.evict_idle(self.idle_ttl).await
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.len().await
    }

    async fn session(
        &self,
        session_id: &str,
    ) -> ApiResult<SharedEditorState> {
        self.sessions
            .get(session_id)
            .await
            .ok_or_else(|| ApiError::NotFound("Editor session not found".to_string()))
    }
}
