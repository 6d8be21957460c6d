pub mod custom_tool;
pub mod mcp_server;

pub use custom_tool::{CustomTool, CustomToolInput};
pub use mcp_server::{McpServer, McpServerInput, McpServerView, DEFAULT_TIMEOUT_SECS};
