pub mod agent_handlers;
pub mod custom_tool_handlers;
pub mod mcp_server_handlers;

pub use agent_handlers::agent_info;
pub use custom_tool_handlers::{
    available_tools, create_custom_tool, delete_custom_tool, list_custom_tools,
};
pub use mcp_server_handlers::{
    create_mcp_server, delete_mcp_server, get_mcp_server, list_mcp_servers, mcp_catalog,
    reload_mcp_servers, update_mcp_server,
};
