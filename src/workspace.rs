// workspace.rs — Workspace store.
//
// Workspaces are the tenant boundary. Two invariants live here and nowhere
// else: the default workspace (id 1) can never be deleted or renamed, and a
// workspace that still owns projects cannot be deleted.

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::scope::DEFAULT_WORKSPACE_ID;
use crate::storage::{Storage, WorkspaceRow};

const NAME_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;

#[derive(Clone)]
pub struct WorkspaceStore {
    storage: Arc<Storage>,
}

impl WorkspaceStore {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<WorkspaceRow> {
        let name = validate_name(name)?;
        let description = normalize_description(description)?;

        if self.storage.workspace_name_taken(&name, None).await? {
            return Err(Error::conflict(format!(
                "A workspace named '{name}' already exists"
            )));
        }

        let workspace = self
            .storage
            .insert_workspace(&name, description.as_deref())
            .await?;
        info!(id = workspace.id, name = %workspace.name, "workspace created");
        Ok(workspace)
    }

    pub async fn get(&self, id: i64) -> Result<WorkspaceRow> {
        self.storage
            .get_workspace(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Workspace with id {id} not found")))
    }

    /// Newest-first, each annotated with its derived `project_count`.
    pub async fn list(&self) -> Result<Vec<WorkspaceRow>> {
        self.storage.list_workspaces().await
    }

    /// Partial update. Renaming the default workspace is forbidden; its
    /// description may still change.
    pub async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<WorkspaceRow> {
        let current = self.get(id).await?;

        let name = match name {
            Some(raw) => {
                let trimmed = validate_name(raw)?;
                if id == DEFAULT_WORKSPACE_ID && trimmed != current.name {
                    return Err(Error::forbidden("The default workspace cannot be renamed"));
                }
                if self.storage.workspace_name_taken(&trimmed, Some(id)).await? {
                    return Err(Error::conflict(format!(
                        "A workspace named '{trimmed}' already exists"
                    )));
                }
                trimmed
            }
            None => current.name,
        };

        let description = match description {
            Some(raw) => normalize_description(Some(raw))?,
            None => current.description,
        };

        self.storage
            .update_workspace(id, &name, description.as_deref())
            .await?;
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if id == DEFAULT_WORKSPACE_ID {
            return Err(Error::forbidden("The default workspace cannot be deleted"));
        }
        let workspace = self.get(id).await?;
        if workspace.project_count > 0 {
            return Err(Error::conflict(format!(
                "Workspace '{}' still contains {} project(s); move or delete them first",
                workspace.name, workspace.project_count
            )));
        }
        self.storage.delete_workspace(id).await?;
        info!(id, name = %workspace.name, "workspace deleted");
        Ok(())
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Workspace name cannot be empty"));
    }
    if trimmed.chars().count() > NAME_MAX {
        return Err(Error::validation(format!(
            "Workspace name cannot exceed {NAME_MAX} characters"
        )));
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
                    "Workspace description cannot exceed {DESCRIPTION_MAX} characters"
                )));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}
