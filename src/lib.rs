pub mod apply;
pub mod config;
pub mod error;
pub mod project;
pub mod rest;
pub mod scope;
pub mod storage;
pub mod template;
pub mod workspace;

use std::sync::Arc;

use apply::ApplyEngine;
use config::DaemonConfig;
use project::ProjectStore;
use storage::Storage;
use template::TemplateStore;
use workspace::WorkspaceStore;

/// Shared application state passed to every REST handler.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<DaemonConfig>,
    pub storage: Arc<Storage>,
    pub workspaces: WorkspaceStore,
    pub projects: ProjectStore,
    pub templates: TemplateStore,
    pub apply: ApplyEngine,
    pub started_at: std::time::Instant,
}

impl AppContext {
    /// Wire the stores and the apply engine around a shared `Storage`.
    pub fn new(config: Arc<DaemonConfig>, storage: Arc<Storage>) -> Self {
        let workspaces = WorkspaceStore::new(storage.clone());
        let projects = ProjectStore::new(storage.clone());
        let templates = TemplateStore::new(storage.clone());
        let apply = ApplyEngine::new(storage.clone());
        Self {
            config,
            storage,
            workspaces,
            projects,
            templates,
            apply,
            started_at: std::time::Instant::now(),
        }
    }
}
