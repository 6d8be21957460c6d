use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;

pub const DEFAULT_TRANSPORT: &str = "streamable-http";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;

/// A persisted MCP tool-server descriptor (one row of `mcp_servers`).
///
/// `args`, `env` and `headers` hold JSON text exactly as stored; they are
/// only decoded when a transport is selected for the row, so a corrupt
/// column affects nothing but its own server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct McpServer {
    pub id: i64,
    pub name: String,
    pub transport: String,
    pub url: Option<String>,
    pub command: Option<String>,
    pub args: Option<String>,    // JSON array of strings
    pub env: Option<String>,     // JSON object
    pub headers: Option<String>, // JSON object
    pub timeout: Option<i64>,
    pub enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_transport() -> String {
    DEFAULT_TRANSPORT.to_string()
}

fn default_timeout() -> Option<i64> {
    Some(DEFAULT_TIMEOUT_SECS)
}

fn default_enabled() -> bool {
    true
}

/// Request body for creating or replacing a descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerInput {
    pub name: String,
    #[serde(default = "default_transport")]
    pub transport: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub env: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default = "default_timeout")]
    pub timeout: Option<i64>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl McpServerInput {
    pub fn stdio(name: &str, command: &str, args: &[&str]) -> Self {
        McpServerInput {
            name: name.to_string(),
            transport: "stdio".to_string(),
            url: None,
            command: Some(command.to_string()),
            args: Some(args.iter().map(|a| a.to_string()).collect()),
            env: None,
            headers: None,
            timeout: default_timeout(),
            enabled: true,
        }
    }

    pub fn http(name: &str, url: &str) -> Self {
        McpServerInput {
            name: name.to_string(),
            transport: DEFAULT_TRANSPORT.to_string(),
            url: Some(url.to_string()),
            command: None,
            args: None,
            env: None,
            headers: None,
            timeout: default_timeout(),
            enabled: true,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }

    /// JSON-encoded `(args, env, headers)` columns. Empty collections are
    /// stored as NULL.
    pub fn encoded_columns(
        &self,
    ) -> Result<(Option<String>, Option<String>, Option<String>), serde_json::Error> {
        let args = match &self.args {
            Some(list) if !list.is_empty() => Some(serde_json::to_string(list)?),
            _ => None,
        };
        let env = encode_map(&self.env)?;
        let headers = encode_map(&self.headers)?;
        Ok((args, env, headers))
    }
}

fn encode_map(
    map: &Option<BTreeMap<String, String>>,
) -> Result<Option<String>, serde_json::Error> {
    match map {
        Some(m) if !m.is_empty() => Ok(Some(serde_json::to_string(m)?)),
        _ => Ok(None),
    }
}

/// API representation of a descriptor with its JSON columns decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerView {
    pub id: i64,
    pub name: String,
    pub transport: String,
    pub url: Option<String>,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub env: Option<BTreeMap<String, String>>,
    pub headers: Option<BTreeMap<String, String>>,
    pub timeout: Option<i64>,
    pub enabled: bool,
}

impl From<McpServer> for McpServerView {
    // Listing never fails on a corrupt column: it renders as empty instead.
    fn from(row: McpServer) -> Self {
        McpServerView {
            args: row
                .args
                .as_deref()
                .map(|raw| serde_json::from_str(raw).unwrap_or_default()),
            env: row
                .env
                .as_deref()
                .map(|raw| serde_json::from_str(raw).unwrap_or_default()),
            headers: row
                .headers
                .as_deref()
                .map(|raw| serde_json::from_str(raw).unwrap_or_default()),
            id: row.id,
            name: row.name,
            transport: row.transport,
            url: row.url,
            command: row.command,
            timeout: row.timeout,
            enabled: row.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(args: Option<&str>, env: Option<&str>, headers: Option<&str>) -> McpServer {
        McpServer {
            id: 1,
            name: "files".to_string(),
            transport: "stdio".to_string(),
            url: None,
            command: Some("mcp-files".to_string()),
            args: args.map(str::to_string),
            env: env.map(str::to_string),
            headers: headers.map(str::to_string),
            timeout: None,
            enabled: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_input_defaults_from_minimal_json() {
        let input: McpServerInput = serde_json::from_str(r#"{"name": "remote"}"#).unwrap();

        assert_eq!(input.transport, "streamable-http");
        assert_eq!(input.timeout, Some(30));
        assert!(input.enabled);
        assert!(input.args.is_none());
    }

    #[test]
    fn test_encoded_columns_store_empty_as_null() {
        let mut input = McpServerInput::stdio("files", "mcp-files", &[]);
        input.env = Some(BTreeMap::new());
        input.headers = Some(BTreeMap::from([(
            "Authorization".to_string(),
            "Bearer t".to_string(),
        )]));

        let (args, env, headers) = input.encoded_columns().unwrap();
        assert_eq!(args, None);
        assert_eq!(env, None);
        assert_eq!(headers.as_deref(), Some(r#"{"Authorization":"Bearer t"}"#));
    }

    #[test]
    fn test_view_decodes_json_columns() {
        let view = McpServerView::from(row(
            Some(r#"["--root","/tmp"]"#),
            Some(r#"{"LOG":"1"}"#),
            None,
        ));

        assert_eq!(
            view.args,
            Some(vec!["--root".to_string(), "/tmp".to_string()])
        );
        assert_eq!(view.env.unwrap().get("LOG").map(String::as_str), Some("1"));
        assert!(view.headers.is_none());
    }

    #[test]
    fn test_view_renders_corrupt_columns_as_empty() {
        let view = McpServerView::from(row(Some("not json"), Some("[1,2"), Some("42")));

        assert_eq!(view.args, Some(vec![]));
        assert_eq!(view.env, Some(BTreeMap::new()));
        assert_eq!(view.headers, Some(BTreeMap::new()));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let input = McpServerInput::http("  ", "http://localhost:1/mcp");
        assert!(input.validate().is_err());
    }
}
