// rest/routes/workspaces.rs — Workspace CRUD routes.
//
// Workspaces are addressed by path id, not by the X-Workspace-Id header —
// the header only scopes project operations.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Error;
use crate::storage::WorkspaceRow;
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

pub async fn list_workspaces(
    State(ctx): State<Arc<AppContext>>,
) -> Result<Json<Vec<WorkspaceRow>>, Error> {
    Ok(Json(ctx.workspaces.list().await?))
}

pub async fn create_workspace(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<WorkspaceRow>), Error> {
    let workspace = ctx
        .workspaces
        .create(&body.name, body.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(workspace)))
}

pub async fn get_workspace(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<WorkspaceRow>, Error> {
    Ok(Json(ctx.workspaces.get(id).await?))
}

pub async fn update_workspace(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateWorkspaceRequest>,
) -> Result<Json<WorkspaceRow>, Error> {
    let workspace = ctx
        .workspaces
        .update(id, body.name.as_deref(), body.description.as_deref())
        .await?;
    Ok(Json(workspace))
}

pub async fn delete_workspace(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    ctx.workspaces.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
