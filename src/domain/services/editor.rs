//! State of one interactive fill-in session.
//!
//! `EditorState` owns a copy of the template body and definitions, the
//! current bindings and the current output. Every event goes through
//! [`EditorState::apply`], which updates state and re-renders synchronously,
//! so callers of any UI style can drive it.

use super::renderer::{initialize_bindings, render, Binding};
use crate::domain::entities::{Template, VariableDefinition};
use crate::domain::errors::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("Binding index {index} is out of range (template has {len} variables)")]
    BindingIndexOutOfRange { index: usize, len: usize },
}

impl From<EditorError> for DomainError {
    fn from(err: EditorError) -> Self {
        DomainError::ValidationError(err.to_string())
    }
}

/// Discrete input from the editing surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    BindingChanged { index: usize, value: String },
    DirectEdit { text: String },
}

/// Where the current output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputSource {
    Rendered,
    DirectEdit,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    template_id: String,
    content: String,
    definitions: Vec<VariableDefinition>,
    bindings: Vec<Binding>,
    output: String,
    source: OutputSource,
    revision: u64,
}

impl EditorState {
    /// Fresh state for `template`: empty bindings, output rendered once.
    pub fn new(template: &Template) -> Self {
        let bindings = initialize_bindings(&template.variables);
        let output = render(&template.content, &bindings);
        Self {
            template_id: template.id.clone(),
            content: template.content.clone(),
            definitions: template.variables.clone(),
            bindings,
            output,
            source: OutputSource::Rendered,
            revision: 0,
        }
    }

    pub fn apply(&mut self, event: EditorEvent) -> Result<&str, EditorError> {
        match event {
            EditorEvent::BindingChanged { index, value } => self.on_binding_changed(index, value),
            EditorEvent::DirectEdit { text } => Ok(self.on_direct_edit(text)),
        }
    }

    /// Set one binding by position and re-render from the original body.
    pub fn on_binding_changed(
        &mut self,
        index: usize,
        value: impl Into<String>,
    ) -> Result<&str, EditorError> {
        let len = self.bindings.len();
        let binding = self
            .bindings
            .get_mut(index)
            .ok_or(EditorError::BindingIndexOutOfRange { index, len })?;
        binding.value = value.into();

        self.output = render(&self.content, &self.bindings);
        self.source = OutputSource::Rendered;
        self.revision += 1;
        Ok(&self.output)
    }

    /// Replace the output verbatim. Bindings and body are untouched.
    pub fn on_direct_edit(&mut self, text: impl Into<String>) -> &str {
        self.output = text.into();
        self.source = OutputSource::DirectEdit;
        self.revision += 1;
        &self.output
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn definitions(&self) -> &[VariableDefinition] {
        &self.definitions
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn source(&self) -> OutputSource {
        self.source
    }

    /// Number of events applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn unresolved(&self) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|b| !b.is_resolved())
            .map(|b| b.name.as_str())
            .collect()
    }
}
