//! Transport selection
//!
//! Maps a stored [`McpServer`] descriptor onto the parameter bundle needed to
//! construct a client for its transport kind. Pure data transformation: no
//! I/O happens here, so every failure is a property of the stored row.

use crate::error::ToolLoadError;
use crate::models::{McpServer, DEFAULT_TIMEOUT_SECS};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Recognised transport kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Stdio,
    StreamableHttp,
    Sse,
}

impl TransportKind {
    pub fn parse(raw: &str) -> Result<Self, ToolLoadError> {
        match raw.trim() {
            "stdio" => Ok(TransportKind::Stdio),
            "streamable-http" | "http" => Ok(TransportKind::StreamableHttp),
            "sse" => Ok(TransportKind::Sse),
            other => Err(ToolLoadError::UnsupportedTransportKind(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Stdio => "stdio",
            TransportKind::StreamableHttp => "streamable-http",
            TransportKind::Sse => "sse",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for a local subprocess speaking MCP over stdio.
#[derive(Debug, Clone, PartialEq)]
pub struct StdioParams {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Only set when the descriptor stores one.
    pub timeout: Option<Duration>,
}

/// Parameters for a remote endpoint (streamable HTTP or SSE).
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteParams {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportParams {
    Stdio(StdioParams),
    StreamableHttp(RemoteParams),
    Sse(RemoteParams),
}

impl TransportParams {
    /// Resolves the transport parameters for one descriptor.
    ///
    /// # Errors
    ///
    /// * `ToolLoadError::UnsupportedTransportKind` - unknown `transport` value
    /// * `ToolLoadError::MalformedStoredConfig` - a required field is missing
    ///   or a JSON column relevant to the kind cannot be decoded
    pub fn select(server: &McpServer) -> Result<Self, ToolLoadError> {
        let kind = TransportKind::parse(&server.transport)?;

        let params = match kind {
            TransportKind::Stdio => TransportParams::Stdio(StdioParams {
                command: required(&server.command, "command")?,
                args: decode_column(&server.args, "args")?,
                env: decode_column(&server.env, "env")?,
                timeout: stored_timeout(server.timeout)?,
            }),
            TransportKind::StreamableHttp => TransportParams::StreamableHttp(remote(server)?),
            TransportKind::Sse => TransportParams::Sse(remote(server)?),
        };

        tracing::debug!("Selected {} transport for MCP server {}", kind, server.name);
        Ok(params)
    }

    pub fn kind(&self) -> TransportKind {
        match self {
            TransportParams::Stdio(_) => TransportKind::Stdio,
            TransportParams::StreamableHttp(_) => TransportKind::StreamableHttp,
            TransportParams::Sse(_) => TransportKind::Sse,
        }
    }
}

fn remote(server: &McpServer) -> Result<RemoteParams, ToolLoadError> {
    let timeout = stored_timeout(server.timeout)?
        .unwrap_or_else(|| Duration::from_secs(DEFAULT_TIMEOUT_SECS as u64));

    Ok(RemoteParams {
        url: required(&server.url, "url")?,
        headers: decode_column(&server.headers, "headers")?,
        timeout,
    })
}

fn required(value: &Option<String>, field: &'static str) -> Result<String, ToolLoadError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ToolLoadError::malformed(field, "required by transport")),
    }
}

fn decode_column<T>(raw: &Option<String>, field: &'static str) -> Result<T, ToolLoadError>
where
    T: serde::de::DeserializeOwned + Default,
{
    match raw.as_deref() {
        None => Ok(T::default()),
        Some(s) if s.trim().is_empty() => Ok(T::default()),
        Some(s) => serde_json::from_str(s).map_err(|e| ToolLoadError::malformed(field, e.to_string())),
    }
}

fn stored_timeout(timeout: Option<i64>) -> Result<Option<Duration>, ToolLoadError> {
    match timeout {
        None => Ok(None),
        Some(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs as u64))),
        Some(secs) => Err(ToolLoadError::malformed(
            "timeout",
            format!("must be positive, got {}", secs),
        )),
    }
}
