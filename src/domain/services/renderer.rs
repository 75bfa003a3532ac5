//! Placeholder substitution for template bodies.
//!
//! A placeholder token is the literal text `{name}`. Rendering walks the
//! original body once, left to right. At every `{` it tries each binding in
//! declaration order and replaces the first whose token starts at that
//! position and whose value is non-empty. Inserted values are never scanned
//! again, so a value that itself looks like `{other}` stays as typed, and a
//! name that is a prefix of another name (`name` / `nameFull`) cannot eat
//! part of the longer token because the closing brace is part of the match.
//!
//! Duplicate names: the first declared binding with a non-empty value wins
//! for every occurrence of that token.

use crate::domain::entities::VariableDefinition;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Value currently assigned to one variable definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.value.is_empty()
    }
}

/// One empty binding per definition, in declaration order.
pub fn initialize_bindings(definitions: &[VariableDefinition]) -> Vec<Binding> {
    definitions
        .iter()
        .map(|definition| Binding::new(definition.name.clone(), String::new()))
        .collect()
}

/// Substitute bound values into `content`. Unbound tokens stay literal.
pub fn render(content: &str, bindings: &[Binding]) -> String {
    render_counted(content, bindings).0
}

/// Number of replacements `render` makes for these bindings.
pub fn substitution_count(content: &str, bindings: &[Binding]) -> usize {
    render_counted(content, bindings).1
}

fn render_counted(content: &str, bindings: &[Binding]) -> (String, usize) {
    let tokens: Vec<(String, &str)> = bindings
        .iter()
        .filter(|b| b.is_resolved())
        .map(|b| (format!("{{{}}}", b.name), b.value.as_str()))
        .collect();

    if tokens.is_empty() {
        return (content.to_string(), 0);
    }

    let mut output = String::with_capacity(content.len());
    let mut replaced = 0;
    let mut rest = content;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let candidate = &rest[open..];

        match tokens
            .iter()
            .find(|(token, _)| candidate.starts_with(token.as_str()))
        {
            Some((token, value)) => {
                output.push_str(value);
                replaced += 1;
                rest = &candidate[token.len()..];
            }
            None => {
                output.push('{');
                rest = &candidate[1..];
            }
        }
    }
    output.push_str(rest);

    (output, replaced)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^{}\s][^{}]*)\}").expect("valid placeholder regex"))
}

/// Distinct placeholder names in first-appearance order.
///
/// Used by the template builder to suggest variable definitions. Rendering
/// itself never goes through this pattern.
pub fn placeholders_in(content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for capture in placeholder_pattern().captures_iter(content) {
        let name = &capture[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
