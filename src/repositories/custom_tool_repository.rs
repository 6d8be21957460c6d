use crate::models::{CustomTool, CustomToolInput};
use crate::repositories::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
pub trait CustomToolRepository: Send + Sync {
    async fn create(&self, input: &CustomToolInput) -> RepositoryResult<CustomTool>;
    async fn list_all(&self) -> RepositoryResult<Vec<CustomTool>>;
    async fn delete(&self, id: i64) -> RepositoryResult<bool>;
}

pub struct SqliteCustomToolRepository {
    pool: SqlitePool,
}

impl SqliteCustomToolRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomToolRepository for SqliteCustomToolRepository {
    async fn create(&self, input: &CustomToolInput) -> RepositoryResult<CustomTool> {
        let id = sqlx::query("INSERT INTO custom_tools (name, config, enabled) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(&input.config)
            .bind(input.enabled)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        sqlx::query_as::<_, CustomTool>(
            "SELECT id, name, config, enabled FROM custom_tools WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    async fn list_all(&self) -> RepositoryResult<Vec<CustomTool>> {
        let tools = sqlx::query_as::<_, CustomTool>(
            "SELECT id, name, config, enabled FROM custom_tools ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tools)
    }

    async fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM custom_tools WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
