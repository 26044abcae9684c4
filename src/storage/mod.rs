// storage/mod.rs — SQLite persistence for workspaces, projects, and templates.
//
// All SQL lives here. The row structs are the wire representations the REST
// layer serializes directly. Case-insensitive uniqueness is enforced twice:
// an application-level pre-check in the stores (friendly error before any
// write) and the unique indexes created in migrations (the safety net for
// concurrent duplicate writes). A losing concurrent write surfaces as a
// unique-constraint violation and is translated to `Error::Conflict` here —
// callers never see a raw sqlx error for that case.

use anyhow::{Context as _, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, ConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};

use crate::error::Error;

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct WorkspaceRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// Derived: number of projects owned by this workspace.
    pub project_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct ProjectRow {
    pub id: i64,
    pub workspace_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    /// Editable title field. Holds a value copy of template content after an
    /// apply — never a reference back to the template.
    pub video_title: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TemplateRow {
    pub id: i64,
    /// Free-form category label, e.g. "title".
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Workspace columns plus the derived `project_count`, shared by every
/// workspace SELECT so list and get stay consistent.
const WORKSPACE_COLUMNS: &str = "w.id, w.name, w.description, w.created_at, w.updated_at, \
     (SELECT COUNT(*) FROM projects p WHERE p.workspace_id = w.id) AS project_count";

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        Self::new_with_slow_query(data_dir, 0).await
    }

    /// Create storage with slow-query logging enabled.
    ///
    /// `slow_query_ms` is the threshold in milliseconds — queries exceeding it
    /// are logged at WARN level. Set to 0 to disable slow-query logging.
    pub async fn new_with_slow_query(data_dir: &Path, slow_query_ms: u64) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("studiod.db");
        let mut opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        if slow_query_ms > 0 {
            opts = opts.log_slow_statements(
                log::LevelFilter::Warn,
                std::time::Duration::from_millis(slow_query_ms),
            );
        }

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Return a clone of the connection pool (cheap — Arc-backed).
    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/storage/migrations")
            .run(pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ─── Workspaces ─────────────────────────────────────────────────────────

    pub async fn insert_workspace(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<WorkspaceRow, Error> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO workspaces (name, description, created_at, updated_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(description)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| translate_unique(e, &format!("A workspace named '{name}' already exists")))?;

        let id = result.last_insert_rowid();
        self.get_workspace(id)
            .await?
            .ok_or_else(|| Error::Internal(sqlx::Error::RowNotFound))
    }

    pub async fn get_workspace(&self, id: i64) -> Result<Option<WorkspaceRow>, Error> {
        let sql = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces w WHERE w.id = ?");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_workspaces(&self) -> Result<Vec<WorkspaceRow>, Error> {
        let sql = format!(
            "SELECT {WORKSPACE_COLUMNS} FROM workspaces w ORDER BY w.created_at DESC, w.id DESC"
        );
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    pub async fn workspace_exists(&self, id: i64) -> Result<bool, Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM workspaces WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Case-insensitive name collision check, optionally excluding one record
    /// (for updates against self).
    pub async fn workspace_name_taken(
        &self,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM workspaces
             WHERE lower(name) = lower(?) AND id != COALESCE(?, -1)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn update_workspace(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<(), Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE workspaces SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                translate_unique(e, &format!("A workspace named '{name}' already exists"))
            })?;
        Ok(())
    }

    pub async fn delete_workspace(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM workspaces WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count_projects_in(&self, workspace_id: i64) -> Result<i64, Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects WHERE workspace_id = ?")
            .bind(workspace_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    // ─── Projects ───────────────────────────────────────────────────────────

    pub async fn insert_project(
        &self,
        workspace_id: i64,
        name: &str,
        description: Option<&str>,
        status: &str,
    ) -> Result<ProjectRow, Error> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO projects (workspace_id, name, description, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(workspace_id)
        .bind(name)
        .bind(description)
        .bind(status)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| translate_unique(e, &format!("A project named '{name}' already exists")))?;

        let id = result.last_insert_rowid();
        self.get_project(id)
            .await?
            .ok_or_else(|| Error::Internal(sqlx::Error::RowNotFound))
    }

    /// Unscoped fetch by primary key. Tenant masking happens one level up in
    /// `scope::owned_project` — call that instead of this from request paths.
    pub async fn get_project(&self, id: i64) -> Result<Option<ProjectRow>, Error> {
        Ok(sqlx::query_as("SELECT * FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_projects(&self, workspace_id: i64) -> Result<Vec<ProjectRow>, Error> {
        Ok(sqlx::query_as(
            "SELECT * FROM projects WHERE workspace_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Case-insensitive name collision check scoped to one workspace.
    pub async fn project_name_taken(
        &self,
        workspace_id: i64,
        name: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM projects
             WHERE workspace_id = ? AND lower(name) = lower(?) AND id != COALESCE(?, -1)",
        )
        .bind(workspace_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    /// Full-row write of the mutable project fields. `workspace_id` and
    /// `created_at` are immutable and never touched here.
    pub async fn update_project(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
        status: &str,
        video_title: Option<&str>,
    ) -> Result<(), Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE projects
             SET name = ?, description = ?, status = ?, video_title = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(description)
        .bind(status)
        .bind(video_title)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| translate_unique(e, &format!("A project named '{name}' already exists")))?;
        Ok(())
    }

    pub async fn delete_project(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Unconditional `video_title` write, used when the field is still empty
    /// at proposal time.
    pub async fn set_video_title(&self, id: i64, value: &str) -> Result<(), Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE projects SET video_title = ?, updated_at = ? WHERE id = ?")
            .bind(value)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Guarded `video_title` write for confirm-apply: commits only when the
    /// current value still equals `expected`. Returns `false` when the guard
    /// failed (row gone or field changed since the proposal) — the atomic
    /// WHERE clause eliminates the TOCTOU window between re-read and write.
    pub async fn confirm_video_title(
        &self,
        id: i64,
        expected: &str,
        proposed: &str,
    ) -> Result<bool, Error> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE projects SET video_title = ?, updated_at = ?
             WHERE id = ? AND video_title = ?",
        )
        .bind(proposed)
        .bind(&now)
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Templates ──────────────────────────────────────────────────────────

    pub async fn insert_template(
        &self,
        kind: &str,
        name: &str,
        content: &str,
    ) -> Result<TemplateRow, Error> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO templates (type, name, content, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(kind)
        .bind(name)
        .bind(content)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| translate_unique(e, "A template with this content already exists"))?;

        let id = result.last_insert_rowid();
        self.get_template(id)
            .await?
            .ok_or_else(|| Error::Internal(sqlx::Error::RowNotFound))
    }

    pub async fn get_template(&self, id: i64) -> Result<Option<TemplateRow>, Error> {
        Ok(sqlx::query_as("SELECT * FROM templates WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn list_templates(&self, kind: Option<&str>) -> Result<Vec<TemplateRow>, Error> {
        match kind {
            Some(kind) => Ok(sqlx::query_as(
                "SELECT * FROM templates WHERE type = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(kind)
            .fetch_all(&self.pool)
            .await?),
            None => Ok(
                sqlx::query_as("SELECT * FROM templates ORDER BY created_at DESC, id DESC")
                    .fetch_all(&self.pool)
                    .await?,
            ),
        }
    }

    /// Case-insensitive content collision check (templates are global).
    pub async fn template_content_taken(
        &self,
        content: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, Error> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM templates
             WHERE lower(content) = lower(?) AND id != COALESCE(?, -1)",
        )
        .bind(content)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    pub async fn update_template(
        &self,
        id: i64,
        kind: &str,
        name: &str,
        content: &str,
    ) -> Result<(), Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE templates SET type = ?, name = ?, content = ?, updated_at = ? WHERE id = ?",
        )
        .bind(kind)
        .bind(name)
        .bind(content)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| translate_unique(e, "A template with this content already exists"))?;
        Ok(())
    }

    pub async fn delete_template(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map a unique-constraint violation to `Conflict`; everything else stays an
/// opaque internal error.
fn translate_unique(err: sqlx::Error, conflict_msg: &str) -> Error {
    match err.as_database_error() {
        Some(db) if db.is_unique_violation() => Error::conflict(conflict_msg),
        _ => Error::Internal(err),
    }
}
