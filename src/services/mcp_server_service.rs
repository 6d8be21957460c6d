use crate::mcp::reconciler::{ReconcileReport, ToolReconciler};
use crate::models::{McpServerInput, McpServerView};
use crate::repositories::{McpServerRepository, RepositoryError};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum McpServerServiceError {
    #[error("Invalid MCP server: {0}")]
    Invalid(String),
    #[error("MCP server not found")]
    NotFound,
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<McpServerServiceError> for crate::error::AppError {
    fn from(err: McpServerServiceError) -> Self {
        match err {
            McpServerServiceError::Invalid(msg) => crate::error::AppError::Validation(msg),
            McpServerServiceError::NotFound => {
                crate::error::AppError::NotFound("MCP server".to_string())
            }
            McpServerServiceError::Repository(e) => e.into(),
        }
    }
}

/// What happened to the tool set after a create or delete was committed.
///
/// Never affects the outcome of the CRUD action itself.
#[derive(Debug)]
pub enum ReloadOutcome {
    Reconciled(ReconcileReport),
    Failed(String),
}

impl ReloadOutcome {
    pub fn report(&self) -> Option<&ReconcileReport> {
        match self {
            ReloadOutcome::Reconciled(report) => Some(report),
            ReloadOutcome::Failed(_) => None,
        }
    }
}

pub struct McpServerService {
    repository: Arc<dyn McpServerRepository>,
    reconciler: Arc<ToolReconciler>,
}

impl McpServerService {
    pub fn new(repository: Arc<dyn McpServerRepository>, reconciler: Arc<ToolReconciler>) -> Self {
        Self {
            repository,
            reconciler,
        }
    }

    pub async fn list(&self) -> Result<Vec<McpServerView>, McpServerServiceError> {
        let servers = self.repository.list_all().await?;
        Ok(servers.into_iter().map(McpServerView::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<McpServerView, McpServerServiceError> {
        self.repository
            .get_by_id(id)
            .await?
            .map(McpServerView::from)
            .ok_or(McpServerServiceError::NotFound)
    }

    /// Stores a new descriptor, then reloads the agent's tools.
    pub async fn create(
        &self,
        input: McpServerInput,
    ) -> Result<(McpServerView, ReloadOutcome), McpServerServiceError> {
        input.validate().map_err(McpServerServiceError::Invalid)?;

        let server = self.repository.create(&input).await?;
        tracing::info!("Created MCP server {} ({})", server.name, server.id);

        let outcome = self.reload().await;
        Ok((McpServerView::from(server), outcome))
    }

    /// Replaces a descriptor. The agent's tools are not reloaded.
    pub async fn update(
        &self,
        id: i64,
        input: McpServerInput,
    ) -> Result<McpServerView, McpServerServiceError> {
        input.validate().map_err(McpServerServiceError::Invalid)?;

        match self.repository.update(id, &input).await {
            Ok(server) => Ok(McpServerView::from(server)),
            Err(RepositoryError::NotFound) => Err(McpServerServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes a descriptor, then reloads the agent's tools.
    pub async fn delete(&self, id: i64) -> Result<ReloadOutcome, McpServerServiceError> {
        if !self.repository.delete(id).await? {
            return Err(McpServerServiceError::NotFound);
        }
        tracing::info!("Deleted MCP server {}", id);

        Ok(self.reload().await)
    }

    async fn reload(&self) -> ReloadOutcome {
        match self.reconciler.reconcile().await {
            Ok(report) => ReloadOutcome::Reconciled(report),
            Err(e) => {
                tracing::warn!("Failed to update agent tools: {}", e);
                ReloadOutcome::Failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::ChatAgent;
    use crate::mcp::builder::ToolClientBuilder;
    use crate::models::McpServer;
    use crate::repositories::MockMcpServerRepository;
    use crate::test_utils::FakeConnector;

    fn row(id: i64, input: &McpServerInput) -> McpServer {
        McpServer {
            id,
            name: input.name.clone(),
            transport: input.transport.clone(),
            url: input.url.clone(),
            command: input.command.clone(),
            args: None,
            env: None,
            headers: None,
            timeout: input.timeout,
            enabled: input.enabled,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn service_with(repo: MockMcpServerRepository) -> McpServerService {
        let repo: Arc<dyn McpServerRepository> = Arc::new(repo);
        let reconciler = Arc::new(ToolReconciler::new(
            repo.clone(),
            ToolClientBuilder::new(Arc::new(FakeConnector::new())),
            Arc::new(ChatAgent::new("a", "Agent", "openai")),
        ));
        McpServerService::new(repo, reconciler)
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_fail_create() {
        let mut repo = MockMcpServerRepository::new();
        repo.expect_create()
            .times(1)
            .returning(|input| Ok(row(5, input)));
        repo.expect_list_enabled()
            .times(1)
            .returning(|| Err(RepositoryError::Database(sqlx::Error::PoolClosed)));

        let service = service_with(repo);
        let (server, outcome) = service
            .create(McpServerInput::http("search", "http://search.local/mcp"))
            .await
            .unwrap();

        assert_eq!(server.id, 5);
        match outcome {
            ReloadOutcome::Failed(msg) => assert!(msg.contains("Configuration store error")),
            other => panic!("Expected failed reload, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_reload_does_not_fail_delete() {
        let mut repo = MockMcpServerRepository::new();
        repo.expect_delete().times(1).returning(|_| Ok(true));
        repo.expect_list_enabled()
            .times(1)
            .returning(|| Err(RepositoryError::Database(sqlx::Error::PoolClosed)));

        let outcome = service_with(repo).delete(5).await.unwrap();

        assert!(outcome.report().is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_skips_reload() {
        let mut repo = MockMcpServerRepository::new();
        repo.expect_delete().times(1).returning(|_| Ok(false));
        repo.expect_list_enabled().never();

        let result = service_with(repo).delete(5).await;

        assert!(matches!(result, Err(McpServerServiceError::NotFound)));
    }
}
