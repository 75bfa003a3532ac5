use crate::{
    domain::entities::{SaveTemplateRequest, Template},
    domain::ports::template_repository::TemplateRepository,
    domain::services::{placeholders_in, render, substitution_count, Binding},
    infrastructure::http::middleware::error::{ApiError, ApiResult},
};
use serde::Serialize;
use std::sync::Arc;

/// Output of a one-shot render of a stored template.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedTemplate {
    pub template_id: String,
    pub content: String,
    pub substitutions: usize,
    /// Placeholders of the body left without a value.
    pub unresolved: Vec<String>,
}

#[derive(Clone)]
pub struct TemplateService {
    template_repo: Arc<dyn TemplateRepository>,
}

impl TemplateService {
    pub fn new(template_repo: Arc<dyn TemplateRepository>) -> Self {
        Self { template_repo }
    }

    pub async fn create_template(&self, request: SaveTemplateRequest) -> ApiResult<Template> {
        let draft = request.into_draft().map_err(|e| {
            tracing::warn!("Rejected template: {}", e);
            ApiError::from(e)
        })?;

        let template = Template::new(draft);
        log_placeholder_mismatches(&template);
        self.template_repo.create_template(&template).await?;

        metrics::counter!("templates_created_total").increment(1);
        tracing::info!(
            "Template created: {} ({}, {} variables)",
            template.name,
            template.id,
            template.variables.len()
        );

        Ok(template)
    }

    pub async fn get_template(&self, id: &str) -> ApiResult<Template> {
        self.template_repo
            .get_template_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Template not found".to_string()))
    }

    /// Catalog listing sorted by name, optionally filtered by a
    /// case-insensitive name fragment.
    pub async fn list_templates(&self, query: Option<&str>) -> ApiResult<Vec<Template>> {
        let templates = self.template_repo.list_templates().await?;

        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => Ok(templates
                .into_iter()
                .filter(|t| t.matches_query(q))
                .collect()),
            None => Ok(templates),
        }
    }

    pub async fn update_template(
        &self,
        id: &str,
        request: SaveTemplateRequest,
    ) -> ApiResult<Template> {
        let draft = request.into_draft()?;

        let mut template = self.get_template(id).await?;
        template.apply(draft);
        log_placeholder_mismatches(&template);

        if !self.template_repo.update_template(&template).await? {
            return Err(ApiError::NotFound("Template not found".to_string()));
        }

        tracing::info!("Template updated: {} ({})", template.name, template.id);
        Ok(template)
    }

    pub async fn delete_template(&self, id: &str) -> ApiResult<()> {
        if !self.template_repo.delete_template(id).await? {
            return Err(ApiError::NotFound("Template not found".to_string()));
        }

        metrics::counter!("templates_deleted_total").increment(1);
        tracing::info!("Template deleted: {}", id);
        Ok(())
    }

    /// Render the stored body with caller-supplied bindings. Nothing is
    /// written back.
    pub async fn render_template(
        &self,
        id: &str,
        bindings: &[Binding],
    ) -> ApiResult<RenderedTemplate> {
        let template = self.get_template(id).await?;

        metrics::counter!("template_renders_total").increment(1);

        let unresolved = placeholders_in(&template.content)
            .into_iter()
            .filter(|name| !bindings.iter().any(|b| &b.name == name && b.is_resolved()))
            .collect();

        Ok(RenderedTemplate {
            content: render(&template.content, bindings),
            substitutions: substitution_count(&template.content, bindings),
            unresolved,
            template_id: template.id,
        })
    }
}

/// Tokens without a definition render literally and definitions without a
/// token have no effect. Both are allowed; note them for the operator.
fn log_placeholder_mismatches(template: &Template) {
    let undeclared: Vec<String> = placeholders_in(&template.content)
        .into_iter()
        .filter(|name| !template.variables.iter().any(|v| &v.name == name))
        .collect();
    if !undeclared.is_empty() {
        tracing::debug!(
            "Template {} has placeholders without variables: {:?}",
            template.id,
            undeclared
        );
    }

    for variable in &template.variables {
        if !template.content.contains(&variable.token()) {
            tracing::debug!(
                "Template {}: variable '{}' does not occur in the body",
                template.id,
                variable.name
            );
        }
    }
}
