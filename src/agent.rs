//! The chat agent and its active tool set
//!
//! There is exactly one agent per process. Its reasoning loop lives outside
//! this crate; here it is a named holder of the tool adapters the model is
//! allowed to call.

use crate::mcp::adapter::ToolAdapter;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

pub type ToolSnapshot = Arc<Vec<Arc<dyn ToolAdapter>>>;

/// The authoritative collection of adapters attached to the agent.
///
/// Replacement swaps the whole collection under a write lock; readers clone
/// the current `Arc` and keep a consistent view even while a swap happens.
#[derive(Default)]
pub struct ToolSet {
    current: RwLock<ToolSnapshot>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> ToolSnapshot {
        Arc::clone(&*self.current.read().await)
    }

    /// Installs `adapters` and returns the set it superseded.
    pub async fn replace(&self, adapters: Vec<Arc<dyn ToolAdapter>>) -> ToolSnapshot {
        let mut current = self.current.write().await;
        std::mem::replace(&mut *current, Arc::new(adapters))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub id: String,
    pub name: String,
    pub model_provider: String,
    pub servers: Vec<String>,
    pub tool_count: usize,
}

pub struct ChatAgent {
    id: String,
    name: String,
    model_provider: String,
    tools: ToolSet,
}

impl ChatAgent {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        model_provider: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            model_provider: model_provider.into(),
            tools: ToolSet::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn tools(&self) -> ToolSnapshot {
        self.tools.snapshot().await
    }

    pub async fn replace_tool_set(&self, adapters: Vec<Arc<dyn ToolAdapter>>) -> ToolSnapshot {
        self.tools.replace(adapters).await
    }

    pub async fn info(&self) -> AgentInfo {
        let tools = self.tools().await;
        AgentInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            model_provider: self.model_provider.clone(),
            servers: tools.iter().map(|a| a.server_name().to_string()).collect(),
            tool_count: tools.iter().map(|a| a.tool_catalog().len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticAdapter;

    #[tokio::test]
    async fn test_replace_returns_previous_set() {
        let agent = ChatAgent::new("a", "Agent", "openai");
        assert_eq!(agent.id(), "a");
        assert_eq!(agent.name(), "Agent");
        assert!(agent.tools().await.is_empty());

        let first: Arc<dyn ToolAdapter> = Arc::new(StaticAdapter::new(1, "one", &["read"]));
        let previous = agent.replace_tool_set(vec![first]).await;
        assert!(previous.is_empty());

        let before = agent.tools().await;
        let second: Arc<dyn ToolAdapter> = Arc::new(StaticAdapter::new(2, "two", &["write", "list"]));
        let previous = agent.replace_tool_set(vec![second]).await;

        assert_eq!(previous.len(), 1);
        assert_eq!(previous[0].server_name(), "one");
        // An earlier snapshot is unaffected by the swap
        assert_eq!(before[0].server_name(), "one");

        let info = agent.info().await;
        assert_eq!(info.servers, vec!["two".to_string()]);
        assert_eq!(info.tool_count, 2);
    }
}
