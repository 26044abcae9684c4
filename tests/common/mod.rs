// Shared test harness: a fresh SQLite database in a temp dir with all the
// stores wired the same way the daemon wires them.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use studiod::{
    apply::ApplyEngine, project::ProjectStore, storage::Storage, template::TemplateStore,
    workspace::WorkspaceStore,
};

pub struct TestContext {
    pub data_dir: PathBuf,
    pub storage: Arc<Storage>,
    pub workspaces: WorkspaceStore,
    pub projects: ProjectStore,
    pub templates: TemplateStore,
    pub apply: ApplyEngine,
}

pub async fn setup() -> TestContext {
    let data_dir = tempfile::tempdir().unwrap().keep();
    let storage = Arc::new(Storage::new(&data_dir).await.unwrap());
    TestContext {
        data_dir,
        storage: storage.clone(),
        workspaces: WorkspaceStore::new(storage.clone()),
        projects: ProjectStore::new(storage.clone()),
        templates: TemplateStore::new(storage.clone()),
        apply: ApplyEngine::new(storage),
    }
}
