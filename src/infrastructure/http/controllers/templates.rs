use crate::{
    application::services::RenderedTemplate,
    domain::entities::{SaveTemplateRequest, Template},
    domain::services::{placeholders_in, Binding},
    infrastructure::http::middleware::{ApiResult, AppState},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub bindings: Vec<Binding>,
}

#[derive(Debug, Deserialize)]
pub struct DetectPlaceholdersRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DetectPlaceholdersResponse {
    pub placeholders: Vec<String>,
}

pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<ListTemplatesQuery>,
) -> ApiResult<Json<Vec<Template>>> {
    let templates = state
        .template_service
        .list_templates(params.q.as_deref())
        .await?;
    Ok(Json(templates))
}

pub async fn create_template(
    State(state): State<AppState>,
    Json(request): Json<SaveTemplateRequest>,
) -> ApiResult<(StatusCode, Json<Template>)> {
    let template = state.template_service.create_template(request).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Template>> {
    let template = state.template_service.get_template(&id).await?;
    Ok(Json(template))
}

pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SaveTemplateRequest>,
) -> ApiResult<Json<Template>> {
    let template = state.template_service.update_template(&id, request).await?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.template_service.delete_template(&id).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

pub async fn render_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenderRequest>,
) -> ApiResult<Json<RenderedTemplate>> {
    let rendered = state
        .template_service
        .render_template(&id, &request.bindings)
        .await?;
    Ok(Json(rendered))
}

/// Placeholder names found in a draft body, for the builder form.
pub async fn detect_placeholders(
    Json(request): Json<DetectPlaceholdersRequest>,
) -> Json<DetectPlaceholdersResponse> {
    Json(DetectPlaceholdersResponse {
        placeholders: placeholders_in(&request.content),
    })
}
