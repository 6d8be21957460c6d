//! Agent tool-set reconciliation
//!
//! Rebuilds the agent's active tool adapters from the enabled rows of the
//! configuration store.
//!
//! # Pass
//!
//! 1. Read enabled descriptors (a store failure fails the pass, nothing is swapped)
//! 2. Build each descriptor; failures are recorded and skipped
//! 3. Swap the successful adapters in as the agent's tool set
//! 4. Close every adapter of the superseded set
//!
//! Passes are serialised, so concurrent triggers never interleave.

use crate::agent::{ChatAgent, ToolSnapshot};
use crate::error::ReconcileError;
use crate::mcp::adapter::ToolSummary;
use crate::mcp::builder::{DescriptorFailure, ToolClientBuilder};
use crate::repositories::McpServerRepository;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub installed_count: usize,
    pub errors: Vec<DescriptorFailure>,
}

/// Tools advertised by one reachable server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerCatalog {
    pub server_id: i64,
    pub server_name: String,
    pub tools: Vec<ToolSummary>,
}

/// Result of a transient catalog query.
///
/// `servers` follows store order and holds one entry per descriptor, so
/// servers sharing a display name are all reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogReport {
    pub servers: Vec<ServerCatalog>,
    pub errors: Vec<DescriptorFailure>,
}

pub struct ToolReconciler {
    repository: Arc<dyn McpServerRepository>,
    builder: ToolClientBuilder,
    agent: Arc<ChatAgent>,
    pass_lock: Mutex<()>,
}

impl ToolReconciler {
    pub fn new(
        repository: Arc<dyn McpServerRepository>,
        builder: ToolClientBuilder,
        agent: Arc<ChatAgent>,
    ) -> Self {
        Self {
            repository,
            builder,
            agent,
            pass_lock: Mutex::new(()),
        }
    }

    pub fn agent(&self) -> &Arc<ChatAgent> {
        &self.agent
    }

    /// Rebuilds and installs the agent's tool set.
    ///
    /// # Errors
    ///
    /// * `ReconcileError::Store` - the enabled descriptors could not be read;
    ///   the previously installed set stays in place
    pub async fn reconcile(&self) -> Result<ReconcileReport, ReconcileError> {
        let _pass = self.pass_lock.lock().await;

        let servers = self.repository.list_enabled().await?;
        let (adapters, errors) = self.builder.build_all(&servers).await;
        let installed_count = adapters.len();

        let previous = self.agent.replace_tool_set(adapters).await;
        release(previous).await;

        tracing::info!(
            "Updated agent {} with {} MCP tool servers ({} failed)",
            self.agent.id(),
            installed_count,
            errors.len()
        );

        Ok(ReconcileReport {
            installed_count,
            errors,
        })
    }

    /// Connects to every enabled descriptor just long enough to list its
    /// tools. The installed set is not read or modified.
    pub async fn probe_catalog(&self) -> Result<CatalogReport, ReconcileError> {
        let servers = self.repository.list_enabled().await?;

        let (adapters, errors) = self.builder.build_all(&servers).await;

        let mut catalog = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            catalog.push(ServerCatalog {
                server_id: adapter.server_id(),
                server_name: adapter.server_name().to_string(),
                tools: adapter.tool_summaries(),
            });
            adapter.close().await;
        }

        Ok(CatalogReport {
            servers: catalog,
            errors,
        })
    }

    /// Detaches and closes the installed set. Used on process shutdown.
    pub async fn shutdown(&self) {
        let _pass = self.pass_lock.lock().await;
        let previous = self.agent.replace_tool_set(Vec::new()).await;
        let count = previous.len();
        release(previous).await;
        tracing::info!("Released {} MCP tool servers", count);
    }
}

async fn release(set: ToolSnapshot) {
    for adapter in set.iter() {
        adapter.close().await;
    }
}
