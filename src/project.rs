// project.rs — Project store.
//
// Every operation here runs under a `Scope` (the acting workspace) and all
// id-addressed reads go through `scope::owned_project`, so a cross-tenant id
// is indistinguishable from a missing one. `workspace_id` is fixed at
// creation; there is no move-between-workspaces operation.

use std::sync::Arc;

use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::scope::{owned_project, Scope};
use crate::storage::{ProjectRow, Storage};

const NAME_MAX: usize = 255;
const DESCRIPTION_MAX: usize = 2000;
const VIDEO_TITLE_MAX: usize = 256;

/// Default status label for new projects. The conventional set is
/// planned | in_progress | completed | archived, but any label is accepted —
/// there is no enforced transition order.
pub const DEFAULT_STATUS: &str = "planned";

/// Partial update payload. `None` means "leave unchanged"; empty strings
/// clear the optional text fields.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub video_title: Option<String>,
}

#[derive(Clone)]
pub struct ProjectStore {
    storage: Arc<Storage>,
}

impl ProjectStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(
        &self,
        scope: Scope,
        name: &str,
        description: Option<&str>,
        status: Option<&str>,
    ) -> Result<ProjectRow> {
        self.ensure_workspace(scope).await?;

        let name = validate_name(name)?;
        let description = normalize_description(description)?;
        let status = validate_status(status.unwrap_or(DEFAULT_STATUS))?;

        if self
            .storage
            .project_name_taken(scope.workspace_id, &name, None)
            .await?
        {
            return Err(duplicate_name(&name));
        }

        let project = self
            .storage
            .insert_project(scope.workspace_id, &name, description.as_deref(), &status)
            .await?;
        info!(
            id = project.id,
            workspace_id = project.workspace_id,
            name = %project.name,
            "project created"
        );
        Ok(project)
    }

    pub async fn get(&self, scope: Scope, id: i64) -> Result<ProjectRow> {
        owned_project(&self.storage, scope, id).await
    }

    /// Newest-first listing of the acting workspace's projects.
    pub async fn list(&self, scope: Scope) -> Result<Vec<ProjectRow>> {
        self.ensure_workspace(scope).await?;
        self.storage.list_projects(scope.workspace_id).await
    }

    pub async fn update(&self, scope: Scope, id: i64, patch: &ProjectPatch) -> Result<ProjectRow> {
        let current = owned_project(&self.storage, scope, id).await?;

        let name = match &patch.name {
            Some(raw) => {
                let trimmed = validate_name(raw)?;
                if self
                    .storage
                    .project_name_taken(scope.workspace_id, &trimmed, Some(id))
                    .await?
                {
                    return Err(duplicate_name(&trimmed));
                }
                trimmed
            }
            None => current.name,
        };

        let description = match &patch.description {
            Some(raw) => normalize_description(Some(raw.as_str()))?,
            None => current.description,
        };

        let status = match &patch.status {
            Some(raw) => validate_status(raw)?,
            None => current.status,
        };

        let video_title = match &patch.video_title {
            Some(raw) => normalize_video_title(raw)?,
            None => current.video_title,
        };

        self.storage
            .update_project(
                id,
                &name,
                description.as_deref(),
                &status,
                video_title.as_deref(),
            )
            .await?;
        owned_project(&self.storage, scope, id).await
    }

    pub async fn delete(&self, scope: Scope, id: i64) -> Result<()> {
        // Scoped load first so a cross-tenant id reports the masked NotFound
        // instead of silently deleting another workspace's project.
        let project = owned_project(&self.storage, scope, id).await?;
        self.storage.delete_project(id).await?;
        info!(
            id,
            workspace_id = project.workspace_id,
            name = %project.name,
            "project deleted"
        );
        Ok(())
    }

    async fn ensure_workspace(&self, scope: Scope) -> Result<()> {
        if !self.storage.workspace_exists(scope.workspace_id).await? {
            return Err(Error::not_found(format!(
                "Workspace with id {} not found",
                scope.workspace_id
            )));
        }
        Ok(())
    }
}

fn duplicate_name(name: &str) -> Error {
    Error::conflict(format!("A project named '{name}' already exists"))
}

fn validate_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Project name cannot be empty"));
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(Error::validation(format!(
            "Project name cannot exceed {NAME_MAX} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_status(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Project status cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_description(raw: Option<&str>) -> Result<Option<String>> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.chars().count() > DESCRIPTION_MAX {
                return Err(Error::validation(format!(
                    "Project description cannot exceed {DESCRIPTION_MAX} characters"
                )));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

fn normalize_video_title(raw: &str) -> Result<Option<String>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > VIDEO_TITLE_MAX {
        return Err(Error::validation(format!(
            "Video title cannot exceed {VIDEO_TITLE_MAX} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(validate_name("  Holiday Special ").unwrap(), "Holiday Special");
    }

    #[test]
    fn empty_name_rejected() {
        assert!(matches!(validate_name(""), Err(Error::Validation(_))));
    }

    #[test]
    fn overlong_description_rejected() {
        let raw = "d".repeat(DESCRIPTION_MAX + 1);
        assert!(matches!(
            normalize_description(Some(&raw)),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn empty_video_title_clears_field() {
        assert_eq!(normalize_video_title("  ").unwrap(), None);
    }
}
