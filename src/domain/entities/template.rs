use crate::domain::errors::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_CONTENT_LENGTH: usize = 50_000;
const PREVIEW_CHARS: usize = 50;

/// Input shape of a single placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VariableKind {
    #[default]
    #[serde(rename = "text", alias = "free-text")]
    FreeText,
    #[serde(rename = "select", alias = "single-select")]
    SingleSelect,
}

/// Declares one `{name}` placeholder of a template body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: VariableKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl VariableDefinition {
    pub fn free_text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::FreeText,
            options: Vec::new(),
            placeholder: None,
        }
    }

    pub fn single_select<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            kind: VariableKind::SingleSelect,
            options: options.into_iter().map(Into::into).collect(),
            placeholder: None,
        }
    }

    /// The literal token this definition substitutes.
    pub fn token(&self) -> String {
        format!("{{{}}}", self.name)
    }

    /// Hint shown in an empty free-text input.
    pub fn input_hint(&self) -> String {
        match self.placeholder.as_deref().filter(|p| !p.is_empty()) {
            Some(hint) => hint.to_string(),
            None => format!("Enter {}", self.name),
        }
    }
}

/// Persisted template record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    pub created_at: String, // ISO 8601
    pub updated_at: String, // ISO 8601
}

impl Template {
    pub fn new(draft: TemplateDraft) -> Self {
        let now = super::now_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: draft.name,
            content: draft.content,
            variables: draft.variables,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Replace name, content and variables in place and bump `updated_at`.
    pub fn apply(&mut self, draft: TemplateDraft) {
        self.name = draft.name;
        self.content = draft.content;
        self.variables = draft.variables;
        self.updated_at = super::now_rfc3339();
    }

    /// Short catalog excerpt of the body.
    pub fn preview(&self) -> String {
        if self.content.is_empty() {
            return "No content".to_string();
        }
        let excerpt: String = self.content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", excerpt)
    }

    pub fn matches_query(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Body of create and update calls. Both replace every editable field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaveTemplateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub variables: Option<Vec<VariableDefinition>>,
}

/// Normalized, validated fields ready for storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDraft {
    pub name: String,
    pub content: String,
    pub variables: Vec<VariableDefinition>,
}

impl SaveTemplateRequest {
    pub fn into_draft(self) -> DomainResult<TemplateDraft> {
        let name = self.name.trim().to_string();
        let content = self.content.trim().to_string();

        if name.is_empty() || content.is_empty() {
            return Err(DomainError::ValidationError(
                "Name and content are required".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "Template name must be at most {} characters",
                MAX_NAME_LENGTH
            )));
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "Template content must be at most {} characters",
                MAX_CONTENT_LENGTH
            )));
        }

        let variables = self
            .variables
            .unwrap_or_default()
            .into_iter()
            .filter(|v| !v.name.trim().is_empty())
            .map(normalize_variable)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(TemplateDraft {
            name,
            content,
            variables,
        })
    }
}

fn normalize_variable(variable: VariableDefinition) -> DomainResult<VariableDefinition> {
    let name = variable.name.trim().to_string();
    let placeholder = variable
        .placeholder
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty());

    match variable.kind {
        VariableKind::FreeText => Ok(VariableDefinition {
            name,
            kind: VariableKind::FreeText,
            options: Vec::new(),
            placeholder,
        }),
        VariableKind::SingleSelect => {
            let options: Vec<String> = variable
                .options
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if options.is_empty() {
                return Err(DomainError::ValidationError(format!(
                    "Select variable '{}' needs at least one option",
                    name
                )));
            }
            Ok(VariableDefinition {
                name,
                kind: VariableKind::SingleSelect,
                options,
                placeholder: None,
            })
        }
    }
}
