// Project store integration tests: tenant scoping and masking, per-workspace
// uniqueness, partial updates, immutable fields, hard delete.

mod common;

use studiod::error::Error;
use studiod::project::ProjectPatch;
use studiod::scope::Scope;

#[tokio::test]
async fn create_defaults_and_normalization() {
    let ctx = common::setup().await;
    let project = ctx
        .projects
        .create(Scope::default(), "  Holiday Special ", Some(""), None)
        .await
        .unwrap();
    assert_eq!(project.name, "Holiday Special");
    assert_eq!(project.description, None);
    assert_eq!(project.status, "planned");
    assert_eq!(project.video_title, None);
    assert_eq!(project.workspace_id, 1);
}

#[tokio::test]
async fn create_under_missing_workspace_is_not_found() {
    let ctx = common::setup().await;
    let err = ctx
        .projects
        .create(Scope::new(999), "Holiday Special", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn cross_tenant_read_is_masked_as_not_found() {
    let ctx = common::setup().await;
    let ws = ctx.workspaces.create("Q4 Videos", None).await.unwrap();
    let project = ctx
        .projects
        .create(Scope::new(ws.id), "Holiday Special", None, None)
        .await
        .unwrap();

    // Reachable under its own workspace.
    ctx.projects.get(Scope::new(ws.id), project.id).await.unwrap();

    // Any other acting workspace sees the same NotFound as a missing id.
    let cross = ctx
        .projects
        .get(Scope::default(), project.id)
        .await
        .unwrap_err();
    let absent = ctx
        .projects
        .get(Scope::new(ws.id), project.id + 1000)
        .await
        .unwrap_err();
    assert!(matches!(cross, Error::NotFound(_)));
    assert!(matches!(absent, Error::NotFound(_)));
}

#[tokio::test]
async fn name_uniqueness_is_per_workspace() {
    let ctx = common::setup().await;
    let ws = ctx.workspaces.create("Q4 Videos", None).await.unwrap();

    ctx.projects
        .create(Scope::default(), "Holiday Special", None, None)
        .await
        .unwrap();
    // Same name in another workspace is fine.
    ctx.projects
        .create(Scope::new(ws.id), "Holiday Special", None, None)
        .await
        .unwrap();

    // Case- or whitespace-variant duplicates in the same workspace conflict.
    let err = ctx
        .projects
        .create(Scope::default(), "holiday special", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    let err = ctx
        .projects
        .create(Scope::default(), " Holiday Special  ", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn partial_update_merges_fields() {
    let ctx = common::setup().await;
    let scope = Scope::default();
    let project = ctx
        .projects
        .create(scope, "Holiday Special", Some("draft plan"), None)
        .await
        .unwrap();

    let updated = ctx
        .projects
        .update(
            scope,
            project.id,
            &ProjectPatch {
                status: Some("in_progress".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, "in_progress");
    assert_eq!(updated.name, "Holiday Special");
    assert_eq!(updated.description.as_deref(), Some("draft plan"));
    assert_eq!(updated.created_at, project.created_at);
    assert_eq!(updated.workspace_id, project.workspace_id);
    assert_ne!(updated.updated_at, project.updated_at);

    // Empty string clears an optional field.
    let cleared = ctx
        .projects
        .update(
            scope,
            project.id,
            &ProjectPatch {
                description: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.description, None);
}

#[tokio::test]
async fn rename_uniqueness_excludes_self() {
    let ctx = common::setup().await;
    let scope = Scope::default();
    let a = ctx
        .projects
        .create(scope, "Alpha", None, None)
        .await
        .unwrap();
    ctx.projects.create(scope, "Beta", None, None).await.unwrap();

    let same = ctx
        .projects
        .update(
            scope,
            a.id,
            &ProjectPatch {
                name: Some("Alpha".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.name, "Alpha");

    let err = ctx
        .projects
        .update(
            scope,
            a.id,
            &ProjectPatch {
                name: Some("BETA".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn cross_tenant_update_and_delete_are_masked() {
    let ctx = common::setup().await;
    let ws = ctx.workspaces.create("Q4 Videos", None).await.unwrap();
    let project = ctx
        .projects
        .create(Scope::new(ws.id), "Holiday Special", None, None)
        .await
        .unwrap();

    let err = ctx
        .projects
        .update(
            Scope::default(),
            project.id,
            &ProjectPatch {
                name: Some("Hijacked".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    let err = ctx
        .projects
        .delete(Scope::default(), project.id)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // Untouched under its own workspace.
    let intact = ctx
        .projects
        .get(Scope::new(ws.id), project.id)
        .await
        .unwrap();
    assert_eq!(intact.name, "Holiday Special");
}

#[tokio::test]
async fn delete_is_permanent_and_reports_not_found_after() {
    let ctx = common::setup().await;
    let scope = Scope::default();
    let project = ctx
        .projects
        .create(scope, "Holiday Special", None, None)
        .await
        .unwrap();

    ctx.projects.delete(scope, project.id).await.unwrap();
    let err = ctx.projects.delete(scope, project.id).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn list_is_scoped_and_newest_first() {
    let ctx = common::setup().await;
    let ws = ctx.workspaces.create("Q4 Videos", None).await.unwrap();
    ctx.projects
        .create(Scope::default(), "Elsewhere", None, None)
        .await
        .unwrap();
    ctx.projects
        .create(Scope::new(ws.id), "First", None, None)
        .await
        .unwrap();
    let second = ctx
        .projects
        .create(Scope::new(ws.id), "Second", None, None)
        .await
        .unwrap();

    let listed = ctx.projects.list(Scope::new(ws.id)).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed.first().map(|p| p.id), Some(second.id));
    assert!(listed.iter().all(|p| p.workspace_id == ws.id));
}
