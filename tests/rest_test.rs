// REST API integration tests: spins a real server on a free port and drives
// it with an HTTP client, covering the status-code mapping and the full
// workspace → project → template → apply walkthrough.

use std::sync::Arc;

use serde_json::{json, Value};
use studiod::{config::DaemonConfig, rest, storage::Storage, AppContext};

/// Start a server on a random port and return its base URL.
async fn start_test_server() -> String {
    let data_dir = tempfile::tempdir().unwrap().keep();
    let config = Arc::new(DaemonConfig::new(
        Some(0),
        Some(data_dir.clone()),
        Some("warn".to_string()),
        None,
    ));
    let storage = Arc::new(Storage::new(&data_dir).await.unwrap());
    let ctx = Arc::new(AppContext::new(config, storage));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = rest::build_router(ctx);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_and_root_respond() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{base}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");

    let body: Value = client
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["name"], "studiod");
}

#[tokio::test]
async fn status_code_mapping() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    // 422 — validation
    let resp = client
        .post(format!("{base}/api/workspaces"))
        .json(&json!({ "name": "   " }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    // 201 — created
    let resp = client
        .post(format!("{base}/api/workspaces"))
        .json(&json!({ "name": "Q4 Videos" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // 409 — duplicate (case-insensitive)
    let resp = client
        .post(format!("{base}/api/workspaces"))
        .json(&json!({ "name": "q4 videos" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    // 403 — default workspace delete
    let resp = client
        .delete(format!("{base}/api/workspaces/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // 404 — absent project
    let resp = client
        .get(format!("{base}/api/projects/9999"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn cross_tenant_project_read_is_404() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    let ws: Value = client
        .post(format!("{base}/api/workspaces"))
        .json(&json!({ "name": "Q4 Videos" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ws_id = ws["id"].as_i64().unwrap();

    let project: Value = client
        .post(format!("{base}/api/projects"))
        .header("X-Workspace-Id", ws_id.to_string())
        .json(&json!({ "name": "Holiday Special" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let project_id = project["id"].as_i64().unwrap();

    // Visible under its own workspace header.
    let resp = client
        .get(format!("{base}/api/projects/{project_id}"))
        .header("X-Workspace-Id", ws_id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Absent header falls back to the default workspace: masked 404.
    let resp = client
        .get(format!("{base}/api/projects/{project_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn template_apply_walkthrough() {
    let base = start_test_server().await;
    let client = reqwest::Client::new();

    // Workspace "Q4 Videos" with one fresh project.
    let ws: Value = client
        .post(format!("{base}/api/workspaces"))
        .json(&json!({ "name": "Q4 Videos" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ws_id = ws["id"].as_i64().unwrap().to_string();

    let project: Value = client
        .post(format!("{base}/api/projects"))
        .header("X-Workspace-Id", &ws_id)
        .json(&json!({ "name": "Holiday Special" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let project_id = project["id"].as_i64().unwrap();
    assert_eq!(project["video_title"], Value::Null);

    let template: Value = client
        .post(format!("{base}/api/templates"))
        .json(&json!({ "type": "title", "name": "Hook", "content": "How to {{action}}" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let template_id = template["id"].as_i64().unwrap();

    // First apply lands immediately.
    let outcome: Value = client
        .post(format!("{base}/api/projects/{project_id}/apply-template"))
        .header("X-Workspace-Id", &ws_id)
        .json(&json!({ "template_id": template_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["applied"], true);
    assert_eq!(outcome["video_title"], "How to {{action}}");

    let project: Value = client
        .get(format!("{base}/api/projects/{project_id}"))
        .header("X-Workspace-Id", &ws_id)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(project["video_title"], "How to {{action}}");

    // A second template now needs confirmation.
    let second: Value = client
        .post(format!("{base}/api/templates"))
        .json(&json!({ "type": "title", "name": "Guide", "content": "{{topic}} in {{year}}" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second_id = second["id"].as_i64().unwrap();

    let outcome: Value = client
        .post(format!("{base}/api/projects/{project_id}/apply-template"))
        .header("X-Workspace-Id", &ws_id)
        .json(&json!({ "template_id": second_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["applied"], false);
    assert_eq!(outcome["confirmation_required"], true);
    assert_eq!(outcome["current_title"], "How to {{action}}");
    assert_eq!(outcome["proposed_title"], "{{topic}} in {{year}}");

    // Confirm with a stale current value → 412.
    let resp = client
        .post(format!(
            "{base}/api/projects/{project_id}/apply-template/confirm"
        ))
        .header("X-Workspace-Id", &ws_id)
        .json(&json!({
            "current_title": "something else",
            "proposed_title": "{{topic}} in {{year}}"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 412);

    // Confirm with the real current value commits.
    let resp = client
        .post(format!(
            "{base}/api/projects/{project_id}/apply-template/confirm"
        ))
        .header("X-Workspace-Id", &ws_id)
        .json(&json!({
            "current_title": "How to {{action}}",
            "proposed_title": "{{topic}} in {{year}}"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let project: Value = resp.json().await.unwrap();
    assert_eq!(project["video_title"], "{{topic}} in {{year}}");
}
