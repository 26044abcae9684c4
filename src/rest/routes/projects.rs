// rest/routes/projects.rs — Project CRUD and template-apply routes.
//
// The `Scope` extractor resolves the acting workspace from X-Workspace-Id
// (absent ⇒ default workspace); every handler threads it into the stores.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::apply::ApplyOutcome;
use crate::error::Error;
use crate::project::ProjectPatch;
use crate::scope::Scope;
use crate::storage::ProjectRow;
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ApplyTemplateRequest {
    pub template_id: i64,
}

#[derive(Deserialize)]
pub struct ConfirmApplyRequest {
    pub current_title: String,
    pub proposed_title: String,
}

pub async fn list_projects(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
) -> Result<Json<Vec<ProjectRow>>, Error> {
    Ok(Json(ctx.projects.list(scope).await?))
}

pub async fn create_project(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
    Json(body): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectRow>), Error> {
    let project = ctx
        .projects
        .create(
            scope,
            &body.name,
            body.description.as_deref(),
            body.status.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn get_project(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
    Path(id): Path<i64>,
) -> Result<Json<ProjectRow>, Error> {
    Ok(Json(ctx.projects.get(scope, id).await?))
}

pub async fn update_project(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
    Path(id): Path<i64>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<ProjectRow>, Error> {
    Ok(Json(ctx.projects.update(scope, id, &patch).await?))
}

pub async fn delete_project(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    ctx.projects.delete(scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn apply_template(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
    Path(id): Path<i64>,
    Json(body): Json<ApplyTemplateRequest>,
) -> Result<Json<Value>, Error> {
    match ctx.apply.propose(scope, id, body.template_id).await? {
        ApplyOutcome::Applied { video_title } => Ok(Json(json!({
            "applied": true,
            "video_title": video_title,
        }))),
        ApplyOutcome::ConfirmationRequired {
            current_title,
            proposed_title,
        } => Ok(Json(json!({
            "applied": false,
            "confirmation_required": true,
            "current_title": current_title,
            "proposed_title": proposed_title,
        }))),
    }
}

pub async fn confirm_apply_template(
    State(ctx): State<Arc<AppContext>>,
    scope: Scope,
    Path(id): Path<i64>,
    Json(body): Json<ConfirmApplyRequest>,
) -> Result<Json<ProjectRow>, Error> {
    let project = ctx
        .apply
        .confirm(scope, id, &body.current_title, &body.proposed_title)
        .await?;
    Ok(Json(project))
}
