// apply.rs — Template application engine.
//
// Two-phase protocol over a project's `video_title`:
//
//   propose: field empty  → write immediately, return Applied
//            field filled → no write, return ConfirmationRequired
//   confirm: a second explicit call after the caller approves the overwrite.
//            Re-validates that the field still holds the value that triggered
//            the confirmation before committing — the two phases are NOT one
//            transaction, so anything may have happened in between.
//
// Placeholders in the template content are copied verbatim; substitution is
// a human's (or a later tool's) job.

use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::scope::{owned_project, Scope};
use crate::storage::{ProjectRow, Storage};

/// Outcome of a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The field was empty; the template content has been written.
    Applied { video_title: String },
    /// The field already holds a value; nothing was written. The caller must
    /// confirm the overwrite explicitly.
    ConfirmationRequired {
        current_title: String,
        proposed_title: String,
    },
}

#[derive(Clone)]
pub struct ApplyEngine {
    storage: Arc<Storage>,
}

impl ApplyEngine {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Apply `template_id`'s content to the project's `video_title`, or ask
    /// for confirmation when the field is already set.
    pub async fn propose(
        &self,
        scope: Scope,
        project_id: i64,
        template_id: i64,
    ) -> Result<ApplyOutcome> {
        let project = owned_project(&self.storage, scope, project_id).await?;
        let template = self
            .storage
            .get_template(template_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Template with id {template_id} not found")))?;

        match project.video_title.as_deref().map(str::trim) {
            None | Some("") => {
                self.storage
                    .set_video_title(project.id, &template.content)
                    .await?;
                info!(
                    project_id = project.id,
                    template_id = template.id,
                    "template applied"
                );
                Ok(ApplyOutcome::Applied {
                    video_title: template.content,
                })
            }
            Some(current) => Ok(ApplyOutcome::ConfirmationRequired {
                current_title: current.to_string(),
                proposed_title: template.content,
            }),
        }
    }

    /// Commit a previously proposed overwrite.
    ///
    /// `current_title` must be the value reported by the matching
    /// `ConfirmationRequired`; if the project is gone or the field has moved
    /// on since, the caller gets `PreconditionFailed` and must re-propose.
    pub async fn confirm(
        &self,
        scope: Scope,
        project_id: i64,
        current_title: &str,
        proposed_title: &str,
    ) -> Result<ProjectRow> {
        if proposed_title.trim().is_empty() {
            return Err(Error::validation("Proposed title cannot be empty"));
        }

        match owned_project(&self.storage, scope, project_id).await {
            Ok(_) => {}
            Err(Error::NotFound(_)) => {
                return Err(Error::precondition_failed(
                    "Project no longer exists; re-propose the template",
                ));
            }
            Err(e) => return Err(e),
        }

        // The WHERE guard makes the re-read-and-write atomic; a zero row
        // count means the field changed (or the row vanished) after the
        // check above.
        let committed = self
            .storage
            .confirm_video_title(project_id, current_title, proposed_title)
            .await?;
        if !committed {
            return Err(Error::precondition_failed(
                "Project title changed since the confirmation was requested; re-propose the template",
            ));
        }

        info!(project_id, "template apply confirmed");
        owned_project(&self.storage, scope, project_id).await
    }
}
