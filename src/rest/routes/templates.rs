// rest/routes/templates.rs — Template CRUD routes.
//
// Templates are global — no workspace scoping, so no `Scope` extractor here.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Error;
use crate::storage::TemplateRow;
use crate::template::TemplatePatch;
use crate::AppContext;

#[derive(Deserialize)]
pub struct CreateTemplateRequest {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub name: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ListTemplatesQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub async fn list_templates(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<Vec<TemplateRow>>, Error> {
    Ok(Json(ctx.templates.list(query.kind.as_deref()).await?))
}

pub async fn create_template(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<CreateTemplateRequest>,
) -> Result<(StatusCode, Json<TemplateRow>), Error> {
    let template = ctx
        .templates
        .create(body.kind.as_deref(), &body.name, &body.content)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<Json<TemplateRow>, Error> {
    Ok(Json(ctx.templates.get(id).await?))
}

pub async fn update_template(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
    Json(patch): Json<TemplatePatch>,
) -> Result<Json<TemplateRow>, Error> {
    Ok(Json(ctx.templates.update(id, &patch).await?))
}

pub async fn delete_template(
    State(ctx): State<Arc<AppContext>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Error> {
    ctx.templates.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
