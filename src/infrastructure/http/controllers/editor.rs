use crate::{
    application::services::EditorSnapshot,
    infrastructure::http::middleware::{ApiResult, AppState},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct OpenSessionRequest {
    pub template_id: String,
    pub previous_session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeBindingRequest {
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct DirectEditRequest {
    #[serde(default)]
    pub text: String,
}

pub async fn open_session(
    State(state): State<AppState>,
    Json(request): Json<OpenSessionRequest>,
) -> ApiResult<(StatusCode, Json<EditorSnapshot>)> {
    let snapshot = state
        .editor_service
        .open(&request.template_id, request.previous_session_id.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<EditorSnapshot>> {
    Ok(Json(state.editor_service.snapshot(&session_id).await?))
}

pub async fn change_binding(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Json(request): Json<ChangeBindingRequest>,
) -> ApiResult<Json<EditorSnapshot>> {
    let snapshot = state
        .editor_service
        .change_binding(&session_id, index, request.value)
        .await?;
    Ok(Json(snapshot))
}

pub async fn direct_edit(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<DirectEditRequest>,
) -> ApiResult<Json<EditorSnapshot>> {
    let snapshot = state
        .editor_service
        .direct_edit(&session_id, request.text)
        .await?;
    Ok(Json(snapshot))
}

pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.editor_service.close(&session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
