use crate::domain::entities::{Template, VariableDefinition};
use crate::domain::ports::template_repository::TemplateRepository;
use crate::infrastructure::http::middleware::error::ApiResult;
use crate::infrastructure::persistence::Database;
use async_trait::async_trait;
use sqlx::{any::AnyRow, Row};

const TEMPLATE_COLUMNS: &str = "id, name, content, variables, created_at, updated_at";

fn template_from_row(row: &AnyRow) -> ApiResult<Template> {
    let variables_json: String = row.try_get("variables")?;
    let variables: Vec<VariableDefinition> = if variables_json.trim().is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&variables_json)?
    };

    Ok(Template {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        content: row.try_get("content")?,
        variables,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl TemplateRepository for Database {
    async fn create_template(&self, template: &Template) -> ApiResult<()> {
        let variables = serde_json::to_string(&template.variables)?;

        sqlx::query(
            "INSERT INTO templates (id, name, content, variables, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&template.id)
        .bind(&template.name)
        .bind(&template.content)
        .bind(variables)
        .bind(&template.created_at)
        .bind(&template.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_template_by_id(&self, id: &str) -> ApiResult<Option<Template>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM templates WHERE id = ?",
            TEMPLATE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(template_from_row).transpose()
    }

    async fn list_templates(&self) -> ApiResult<Vec<Template>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM templates ORDER BY name ASC, created_at ASC",
            TEMPLATE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(template_from_row).collect()
    }

    async fn update_template(&self, template: &Template) -> ApiResult<bool> {
        let variables = serde_json::to_string(&template.variables)?;

        let result = sqlx::query(
            "UPDATE templates
             SET name = ?, content = ?, variables = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&template.name)
        .bind(&template.content)
        .bind(variables)
        .bind(&template.updated_at)
        .bind(&template.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_template(&self, id: &str) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
