pub mod mcp_server_service;

pub use mcp_server_service::{McpServerService, McpServerServiceError, ReloadOutcome};
