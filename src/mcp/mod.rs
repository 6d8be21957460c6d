//! MCP tool-server integration
//!
//! Turns stored tool-server descriptors into live tool adapters attached to
//! the agent, and keeps that set in step with the configuration store.
//!
//! # Architecture
//!
//! - [`transport`] - Maps a descriptor to transport parameters (pure)
//! - [`connector`] - Connects parameters to a live server ([`RmcpConnector`])
//! - [`builder`] - Builds adapters per descriptor, isolating failures
//! - [`reconciler`] - Swaps the agent's tool set and releases the old one
//!
//! # Example
//!
//! ```rust,no_run
//! use scopex::agent::ChatAgent;
//! use scopex::mcp::{RmcpConnector, ToolClientBuilder, ToolReconciler};
//! use scopex::repositories::SqliteMcpServerRepository;
//! use sqlx::SqlitePool;
//! use std::sync::Arc;
//!
//! # async fn example(pool: SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let agent = Arc::new(ChatAgent::new("scopex-agent", "ScopeX Assistant", "openai"));
//! let reconciler = ToolReconciler::new(
//!     Arc::new(SqliteMcpServerRepository::new(pool)),
//!     ToolClientBuilder::new(Arc::new(RmcpConnector::new())),
//!     agent.clone(),
//! );
//!
//! let report = reconciler.reconcile().await?;
//! println!("{} servers installed", report.installed_count);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod builder;
pub mod connector;
pub mod reconciler;
pub mod transport;

pub use adapter::{ToolAdapter, ToolCatalog, ToolInfo, ToolSummary};
pub use builder::{DescriptorFailure, ToolClientBuilder};
pub use connector::{RmcpConnector, RmcpToolAdapter, ToolConnector};
pub use reconciler::{CatalogReport, ReconcileReport, ServerCatalog, ToolReconciler};
pub use transport::{RemoteParams, StdioParams, TransportKind, TransportParams};
