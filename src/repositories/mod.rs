pub mod custom_tool_repository;
pub mod mcp_server_repository;

pub use custom_tool_repository::{CustomToolRepository, SqliteCustomToolRepository};
pub use mcp_server_repository::{McpServerRepository, SqliteMcpServerRepository};

#[cfg(test)]
pub use mcp_server_repository::MockMcpServerRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Failed to encode column: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
