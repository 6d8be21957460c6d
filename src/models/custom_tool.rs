use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored metadata for a custom tool. Not attached to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CustomTool {
    pub id: i64,
    pub name: String,
    pub config: Option<String>, // free-form, usually JSON
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomToolInput {
    pub name: String,
    #[serde(default)]
    pub config: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}
