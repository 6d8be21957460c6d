//! Connected tool adapters
//!
//! A [`ToolAdapter`] is a live handle to one MCP server. The tool catalog is
//! part of the trait, so every adapter has one (possibly empty).

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

/// Source label attached to every tool discovered on an MCP server.
pub const MCP_TOOL_SOURCE: &str = "MCP Tool";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInfo {
    pub description: String,
    pub source: String,
}

/// Tool name to metadata, as advertised by the server.
pub type ToolCatalog = BTreeMap<String, ToolInfo>;

/// Flattened catalog entry used in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

#[async_trait]
pub trait ToolAdapter: Send + Sync {
    /// Id of the descriptor this adapter was built from.
    fn server_id(&self) -> i64;

    fn server_name(&self) -> &str;

    fn tool_catalog(&self) -> &ToolCatalog;

    /// Releases the underlying connection or subprocess.
    ///
    /// Must be idempotent: the reconciler calls it once when the adapter is
    /// superseded, and other holders of a snapshot may race with it.
    async fn close(&self);

    fn tool_summaries(&self) -> Vec<ToolSummary> {
        self.tool_catalog()
            .iter()
            .map(|(name, info)| ToolSummary {
                name: name.clone(),
                description: info.description.clone(),
            })
            .collect()
    }
}

/// Builds a catalog from `(name, description)` pairs.
pub fn catalog_from<I, N, D>(tools: I) -> ToolCatalog
where
    I: IntoIterator<Item = (N, Option<D>)>,
    N: Into<String>,
    D: Into<String>,
{
    tools
        .into_iter()
        .map(|(name, description)| {
            (
                name.into(),
                ToolInfo {
                    description: description.map(Into::into).unwrap_or_default(),
                    source: MCP_TOOL_SOURCE.to_string(),
                },
            )
        })
        .collect()
}
