use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Tool reconciliation failed: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Internal server error")]
    InternalError,
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::NotFound => AppError::NotFound("Record".to_string()),
            RepositoryError::Encoding(e) => AppError::Validation(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            AppError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{} not found", what)),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Reconcile(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Database(_) | AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Failure to turn one stored descriptor into a connected tool adapter.
///
/// Every variant is fatal to the descriptor that produced it and to nothing
/// else: the builder records it and moves on to the next descriptor.
#[derive(Debug, Error)]
pub enum ToolLoadError {
    /// The descriptor names a transport kind outside the recognised set.
    #[error("Unsupported transport: {0}")]
    UnsupportedTransportKind(String),

    /// A stored column could not be decoded, or a field required by the
    /// declared transport is missing.
    #[error("Malformed stored config in `{field}`: {reason}")]
    MalformedStoredConfig { field: &'static str, reason: String },

    /// Spawning, connecting, the MCP handshake, or the initial tool listing
    /// failed.
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl ToolLoadError {
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        ToolLoadError::MalformedStoredConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ToolLoadErrorKind {
        match self {
            ToolLoadError::UnsupportedTransportKind(_) => ToolLoadErrorKind::UnsupportedTransportKind,
            ToolLoadError::MalformedStoredConfig { .. } => ToolLoadErrorKind::MalformedStoredConfig,
            ToolLoadError::Connection(_) => ToolLoadErrorKind::ConnectionError,
        }
    }
}

/// Serializable discriminant of [`ToolLoadError`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolLoadErrorKind {
    UnsupportedTransportKind,
    MalformedStoredConfig,
    ConnectionError,
}

/// Failure of a whole reconciliation pass.
///
/// Only the configuration-store read can fail a pass; per-descriptor
/// failures are reported inside the pass result instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Configuration store error: {0}")]
    Store(#[from] RepositoryError),
}
