use crate::models::{McpServer, McpServerInput};
use crate::repositories::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

const SELECT_COLUMNS: &str = "SELECT id, name, transport, url, command, args, env, headers, \
     timeout, enabled, created_at, updated_at FROM mcp_servers";

/// The configuration store for MCP tool-server descriptors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait McpServerRepository: Send + Sync {
    async fn create(&self, input: &McpServerInput) -> RepositoryResult<McpServer>;
    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<McpServer>>;
    async fn list_all(&self) -> RepositoryResult<Vec<McpServer>>;
    /// Enabled descriptors in insertion order.
    async fn list_enabled(&self) -> RepositoryResult<Vec<McpServer>>;
    async fn update(&self, id: i64, input: &McpServerInput) -> RepositoryResult<McpServer>;
    /// Returns `false` when no row had that id.
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}

pub struct SqliteMcpServerRepository {
    pool: SqlitePool,
}

impl SqliteMcpServerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl McpServerRepository for SqliteMcpServerRepository {
    async fn create(&self, input: &McpServerInput) -> RepositoryResult<McpServer> {
        let (args, env, headers) = input.encoded_columns()?;

        let id = sqlx::query(
            r#"
            INSERT INTO mcp_servers (name, transport, url, command, args, env, headers, timeout, enabled)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.name)
        .bind(&input.transport)
        .bind(&input.url)
        .bind(&input.command)
        .bind(args)
        .bind(env)
        .bind(headers)
        .bind(input.timeout)
        .bind(input.enabled)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn get_by_id(&self, id: i64) -> RepositoryResult<Option<McpServer>> {
        let server = sqlx::query_as::<_, McpServer>(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(server)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<McpServer>> {
        let servers = sqlx::query_as::<_, McpServer>(&format!("{} ORDER BY id", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(servers)
    }

    async fn list_enabled(&self) -> RepositoryResult<Vec<McpServer>> {
        let servers = sqlx::query_as::<_, McpServer>(&format!(
            "{} WHERE enabled = 1 ORDER BY id",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(servers)
    }

    async fn update(&self, id: i64, input: &McpServerInput) -> RepositoryResult<McpServer> {
        let (args, env, headers) = input.encoded_columns()?;

        let result = sqlx::query(
            r#"
            UPDATE mcp_servers
            SET name = ?, transport = ?, url = ?, command = ?, args = ?, env = ?, headers = ?,
                timeout = ?, enabled = ?, updated_at = unixepoch()
            WHERE id = ?
            "#,
        )
        .bind(&input.name)
        .bind(&input.transport)
        .bind(&input.url)
        .bind(&input.command)
        .bind(args)
        .bind(env)
        .bind(headers)
        .bind(input.timeout)
        .bind(input.enabled)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM mcp_servers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
