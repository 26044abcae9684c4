// error.rs — Domain error taxonomy and its HTTP mapping.
//
// Every store returns `Error`; REST handlers bubble it up with `?` and the
// `IntoResponse` impl below picks the status line. Only `Internal` collapses
// to an opaque 500 — all other variants carry their detail verbatim to the
// caller (trusted single-operator context).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed, oversized, or missing field. Caught before any mutation.
    #[error("{0}")]
    Validation(String),

    /// Duplicate name/content, or deleting a non-empty workspace.
    #[error("{0}")]
    Conflict(String),

    /// Mutating the default workspace's identity.
    #[error("{0}")]
    Forbidden(String),

    /// Absent record — or a cross-tenant id, deliberately indistinguishable.
    #[error("{0}")]
    NotFound(String),

    /// Confirm-apply observed a state change since the matching proposal.
    #[error("{0}")]
    PreconditionFailed(String),

    /// Unexpected storage failure. Logged, surfaced as an opaque 500.
    #[error("internal storage error")]
    Internal(#[from] sqlx::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn precondition_failed(msg: impl Into<String>) -> Self {
        Self::PreconditionFailed(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if let Self::Internal(e) = &self {
            tracing::error!("storage error: {e}");
        }
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
