// template.rs — Template store.
//
// Templates are reusable placeholder-bearing text patterns, global across
// workspaces. Content must contain at least one `{{...}}` span with a
// non-empty interior; spans are copied verbatim on apply, never substituted.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{Storage, TemplateRow};

const NAME_MAX: usize = 100;
const TYPE_MAX: usize = 50;
const CONTENT_MAX: usize = 256;

/// Default category when a template is created without an explicit type.
pub const DEFAULT_TYPE: &str = "title";

/// Matches one placeholder span; the capture is its interior.
static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("placeholder regex"));

/// Partial update payload. `None` means "leave unchanged".
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TemplatePatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct TemplateStore {
    storage: Arc<Storage>,
}

impl TemplateStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(
        &self,
        kind: Option<&str>,
        name: &str,
        content: &str,
    ) -> Result<TemplateRow> {
        let kind = validate_type(kind.unwrap_or(DEFAULT_TYPE))?;
        let name = validate_name(name)?;
        let content = validate_content(content)?;

        if self.storage.template_content_taken(&content, None).await? {
            return Err(duplicate_content());
        }

        let template = self.storage.insert_template(&kind, &name, &content).await?;
        info!(id = template.id, kind = %template.kind, "template created");
        Ok(template)
    }

    pub async fn get(&self, id: i64) -> Result<TemplateRow> {
        self.storage
            .get_template(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Template with id {id} not found")))
    }

    /// Newest-first, optionally filtered by type.
    pub async fn list(&self, kind: Option<&str>) -> Result<Vec<TemplateRow>> {
        self.storage.list_templates(kind).await
    }

    pub async fn update(&self, id: i64, patch: &TemplatePatch) -> Result<TemplateRow> {
        let current = self.get(id).await?;

        let kind = match &patch.kind {
            Some(raw) => validate_type(raw)?,
            None => current.kind,
        };

        let name = match &patch.name {
            Some(raw) => validate_name(raw)?,
            None => current.name,
        };

        let content = match &patch.content {
            Some(raw) => {
                let validated = validate_content(raw)?;
                if self
                    .storage
                    .template_content_taken(&validated, Some(id))
                    .await?
                {
                    return Err(duplicate_content());
                }
                validated
            }
            None => current.content,
        };

        self.storage.update_template(id, &kind, &name, &content).await?;
        self.get(id).await
    }

    /// Hard delete. Projects that already consumed this template's content
    /// keep their `video_title` — applied content is a value copy.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.storage.delete_template(id).await? {
            return Err(Error::not_found(format!("Template with id {id} not found")));
        }
        info!(id, "template deleted");
        Ok(())
    }
}

fn duplicate_content() -> Error {
    Error::conflict("A template with this content already exists")
}

fn validate_type(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Template type cannot be empty"));
    }
    if trimmed.chars().count() > TYPE_MAX {
        return Err(Error::validation(format!(
            "Template type cannot exceed {TYPE_MAX} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Template name cannot be empty"));
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(Error::validation(format!(
            "Template name cannot exceed {NAME_MAX} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim, cap length, and require at least one non-empty `{{...}}` span; any
/// empty span anywhere in the content is an error.
fn validate_content(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Template content cannot be empty"));
    }
    if trimmed.chars().count() > CONTENT_MAX {
        return Err(Error::validation(format!(
            "Template content cannot exceed {CONTENT_MAX} characters"
        )));
    }

    let mut spans = 0;
    for captures in PLACEHOLDER_RE.captures_iter(trimmed) {
        let interior = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        if interior.trim().is_empty() {
            return Err(Error::validation(
                "Template placeholders cannot be empty — use {{name}}",
            ));
        }
        spans += 1;
    }
    if spans == 0 {
        return Err(Error::validation(
            "Template content must contain at least one {{placeholder}}",
        ));
    }

    Ok(trimmed.to_string())
}
