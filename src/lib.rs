pub mod agent;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mcp;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

use agent::ChatAgent;
use mcp::{ToolClientBuilder, ToolConnector, ToolReconciler};
use repositories::{
    CustomToolRepository, McpServerRepository, SqliteCustomToolRepository,
    SqliteMcpServerRepository,
};
use services::McpServerService;

#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub agent: Arc<ChatAgent>,
    pub reconciler: Arc<ToolReconciler>,
    pub mcp_server_service: Arc<McpServerService>,
    pub custom_tool_repository: Arc<dyn CustomToolRepository>,
}

impl AppState {
    /// Wires repositories, the reconciler and services around one pool.
    ///
    /// The agent starts with an empty tool set; run
    /// [`ToolReconciler::reconcile`] to populate it.
    pub fn new(pool: sqlx::SqlitePool, agent: ChatAgent, connector: Arc<dyn ToolConnector>) -> Self {
        let agent = Arc::new(agent);
        let mcp_server_repository: Arc<dyn McpServerRepository> =
            Arc::new(SqliteMcpServerRepository::new(pool.clone()));

        let reconciler = Arc::new(ToolReconciler::new(
            mcp_server_repository.clone(),
            ToolClientBuilder::new(connector),
            agent.clone(),
        ));

        let mcp_server_service = Arc::new(McpServerService::new(
            mcp_server_repository,
            reconciler.clone(),
        ));

        AppState {
            custom_tool_repository: Arc::new(SqliteCustomToolRepository::new(pool.clone())),
            pool,
            agent,
            reconciler,
            mcp_server_service,
        }
    }
}
