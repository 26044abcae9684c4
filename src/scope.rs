// scope.rs — Resource isolation layer.
//
// Every workspace-addressed operation runs under a `Scope`: the acting
// workspace id resolved from the `X-Workspace-Id` request header (absent or
// unparsable ⇒ the default workspace, id 1). The scope is threaded through
// store calls as an explicit parameter — never stored as process-global state.
//
// Cross-tenant masking lives in exactly one place: `owned_project`. An id
// that belongs to a different workspace is reported with the same `NotFound`
// as a truly absent id, so callers cannot probe for existence across tenants.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{Error, Result};
use crate::storage::{ProjectRow, Storage};

/// Request header carrying the acting workspace id.
pub const WORKSPACE_HEADER: &str = "X-Workspace-Id";

/// The permanent default workspace. Cannot be deleted or renamed.
pub const DEFAULT_WORKSPACE_ID: i64 = 1;

/// Acting-workspace context for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub workspace_id: i64,
}

impl Scope {
    pub fn new(workspace_id: i64) -> Self {
        Self { workspace_id }
    }

    /// Resolve from an optional caller-supplied id; absent falls back to the
    /// default workspace.
    pub fn resolve(workspace_id: Option<i64>) -> Self {
        Self::new(workspace_id.unwrap_or(DEFAULT_WORKSPACE_ID))
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(DEFAULT_WORKSPACE_ID)
    }
}

impl<S> FromRequestParts<S> for Scope
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(WORKSPACE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok());
        Ok(Scope::resolve(id))
    }
}

/// Load a project the acting workspace is allowed to see.
///
/// The single shared ownership check: loads by id, then compares the record's
/// `workspace_id` to the scope. Absent and cross-tenant are deliberately
/// indistinguishable in the returned error.
pub async fn owned_project(storage: &Storage, scope: Scope, id: i64) -> Result<ProjectRow> {
    match storage.get_project(id).await? {
        Some(project) if project.workspace_id == scope.workspace_id => Ok(project),
        _ => Err(Error::not_found(format!("Project with id {id} not found"))),
    }
}
