// rest/mod.rs — Public REST API server.
//
// Endpoints:
//   GET  /                       service info
//   GET  /api/health             health check
//   GET  POST /api/workspaces    + GET/PUT/DELETE /api/workspaces/{id}
//   GET  POST /api/projects      + GET/PUT/DELETE /api/projects/{id}
//        (scoped by the X-Workspace-Id header, default workspace 1)
//   POST /api/projects/{id}/apply-template
//   POST /api/projects/{id}/apply-template/confirm
//   GET  POST /api/templates     + GET/PUT/DELETE /api/templates/{id}

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::AppContext;

pub async fn start_rest_server(ctx: Arc<AppContext>) -> Result<()> {
    let bind = format!("{}:{}", ctx.config.bind_address, ctx.config.port);
    let addr: SocketAddr = bind.parse()?;

    let router = build_router(ctx);

    info!("REST API listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let cors = cors_layer(&ctx.config.cors_origin);
    Router::new()
        .route("/", get(routes::health::root))
        .route("/api/health", get(routes::health::health))
        // Workspaces
        .route(
            "/api/workspaces",
            get(routes::workspaces::list_workspaces).post(routes::workspaces::create_workspace),
        )
        .route(
            "/api/workspaces/{id}",
            get(routes::workspaces::get_workspace)
                .put(routes::workspaces::update_workspace)
                .delete(routes::workspaces::delete_workspace),
        )
        // Projects (workspace-scoped)
        .route(
            "/api/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(routes::projects::get_project)
                .put(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/api/projects/{id}/apply-template",
            post(routes::projects::apply_template),
        )
        .route(
            "/api/projects/{id}/apply-template/confirm",
            post(routes::projects::confirm_apply_template),
        )
        // Templates (global)
        .route(
            "/api/templates",
            get(routes::templates::list_templates).post(routes::templates::create_template),
        )
        .route(
            "/api/templates/{id}",
            get(routes::templates::get_template)
                .put(routes::templates::update_template)
                .delete(routes::templates::delete_template),
        )
        .layer(cors)
        .with_state(ctx)
}

/// CORS for the local planning frontend. Credentials require an exact origin,
/// so a malformed configured origin falls back to a closed layer.
fn cors_layer(origin: &str) -> CorsLayer {
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-workspace-id"),
            ])
            .allow_credentials(true),
        Err(_) => {
            warn!("invalid cors_origin '{origin}', CORS disabled");
            CorsLayer::new()
        }
    }
}
