//! Tool-client builder
//!
//! Turns descriptors into connected adapters one at a time. A descriptor that
//! fails to build is recorded and skipped; it never stops the others.

use crate::error::{ToolLoadError, ToolLoadErrorKind};
use crate::mcp::adapter::ToolAdapter;
use crate::mcp::connector::ToolConnector;
use crate::mcp::transport::TransportParams;
use crate::models::McpServer;
use serde::Serialize;
use std::sync::Arc;

/// One descriptor that could not be turned into an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorFailure {
    pub server_id: i64,
    pub server_name: String,
    pub kind: ToolLoadErrorKind,
    pub message: String,
}

impl DescriptorFailure {
    fn new(server: &McpServer, error: &ToolLoadError) -> Self {
        Self {
            server_id: server.id,
            server_name: server.name.clone(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ToolClientBuilder {
    connector: Arc<dyn ToolConnector>,
}

impl ToolClientBuilder {
    pub fn new(connector: Arc<dyn ToolConnector>) -> Self {
        Self { connector }
    }

    /// Selects the transport for `server` and connects it.
    pub async fn build(&self, server: &McpServer) -> Result<Arc<dyn ToolAdapter>, ToolLoadError> {
        let params = TransportParams::select(server)?;
        self.connector.connect(server, params).await
    }

    /// Builds every descriptor in order, collecting successes and failures
    /// separately.
    pub async fn build_all(
        &self,
        servers: &[McpServer],
    ) -> (Vec<Arc<dyn ToolAdapter>>, Vec<DescriptorFailure>) {
        let mut adapters = Vec::with_capacity(servers.len());
        let mut failures = Vec::new();

        for server in servers {
            match self.build(server).await {
                Ok(adapter) => {
                    tracing::info!("Successfully loaded MCP server: {}", server.name);
                    adapters.push(adapter);
                }
                Err(e) => {
                    tracing::warn!("Failed to load MCP server {}: {}", server.name, e);
                    failures.push(DescriptorFailure::new(server, &e));
                }
            }
        }

        (adapters, failures)
    }
}
