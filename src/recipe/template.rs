// src/recipe/template.rs

//! Placeholder substitution for recipe templates
//!
//! Templates carry `__name__` placeholders (`__project_name__`,
//! `__project_version__`, `__conan_pkgs__`, ...) that a substitution
//! context fills in. Substitution is a pure find-and-replace pass over
//! text: every placeholder must be consumed, and context keys that match
//! nothing are reported as warnings, not errors. The engine never
//! touches the filesystem; callers feed it strings, including file names
//! that carry placeholders.

use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"__([A-Za-z0-9_]+)__").unwrap());

/// A value supplied for one placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    /// Literal text, inserted verbatim
    Text(String),

    /// Requirement strings, rendered as `"fmt/7.1.2", "cli11/1.9.1"`
    Requirements(Vec<String>),
}

impl ContextValue {
    fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Requirements(pkgs) => pkgs
                .iter()
                .map(|pkg| format!("\"{}\"", pkg))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Substitution context mapping placeholder names to values
///
/// Keys are bare names; the `__` delimiters belong to the template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    values: BTreeMap<String, ContextValue>,
}

impl SubstitutionContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placeholder to literal text
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values
            .insert(key.into(), ContextValue::Text(value.into()));
        self
    }

    /// Bind a placeholder to a requirement list
    pub fn with_requirements<I, S>(mut self, key: impl Into<String>, pkgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values.insert(
            key.into(),
            ContextValue::Requirements(pkgs.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Bind a placeholder to an explicit value
    pub fn insert(&mut self, key: impl Into<String>, value: ContextValue) {
        self.values.insert(key.into(), value);
    }

    /// Check whether the context is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of rendering a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The substituted text
    pub text: String,

    /// One entry per context key that matched no placeholder (non-fatal)
    pub warnings: Vec<String>,
}

/// Substitute a context into a template
///
/// Fails with `UnresolvedPlaceholder` if any `__name__` token survives
/// the pass, naming the first survivor.
pub fn render(template: &str, ctx: &SubstitutionContext) -> Result<Rendered> {
    let mut text = template.to_string();
    let mut warnings = Vec::new();

    for (key, value) in &ctx.values {
        let token = format!("__{}__", key);
        if !text.contains(&token) {
            warn!(key = %key, "context key matches no placeholder");
            warnings.push(format!("Context key '{}' matches no placeholder", key));
            continue;
        }
        text = text.replace(&token, &value.render());
    }

    if let Some(residual) = PLACEHOLDER.find(&text) {
        return Err(Error::UnresolvedPlaceholder(residual.as_str().to_string()));
    }

    Ok(Rendered { text, warnings })
}
