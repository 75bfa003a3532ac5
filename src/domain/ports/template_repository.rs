use crate::domain::entities::Template;
use crate::infrastructure::http::middleware::error::ApiResult;
use async_trait::async_trait;

#[async_trait]
pub trait TemplateRepository: Send + Sync {
    async fn create_template(&self, template: &Template) -> ApiResult<()>;
    async fn get_template_by_id(&self, id: &str) -> ApiResult<Option<Template>>;
    /// All templates ordered by name ascending.
    async fn list_templates(&self) -> ApiResult<Vec<Template>>;
    /// Returns false when no row matched `template.id`.
    async fn update_template(&self, template: &Template) -> ApiResult<bool>;
    /// Returns false when no row matched `id`.
    async fn delete_template(&self, id: &str) -> ApiResult<bool>;
}
