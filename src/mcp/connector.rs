//! Connecting descriptors to live MCP servers
//!
//! [`ToolConnector`] is the seam between reconciliation and the MCP client
//! library. [`RmcpConnector`] is the production implementation; it speaks
//! stdio, streamable HTTP and SSE through rmcp.

use crate::error::ToolLoadError;
use crate::mcp::adapter::{catalog_from, ToolAdapter, ToolCatalog};
use crate::mcp::transport::{RemoteParams, StdioParams, TransportParams};
use crate::models::McpServer;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::service::{RoleClient, RunningService};
use rmcp::transport::sse_client::SseClientConfig;
use rmcp::transport::streamable_http_client::StreamableHttpClientTransportConfig;
use rmcp::transport::{SseClientTransport, StreamableHttpClientTransport, TokioChildProcess};
use rmcp::ServiceExt;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::Mutex;

type ClientService = RunningService<RoleClient, ()>;

/// Constructs and connects an adapter for already-selected parameters.
#[async_trait]
pub trait ToolConnector: Send + Sync {
    async fn connect(
        &self,
        server: &McpServer,
        params: TransportParams,
    ) -> Result<Arc<dyn ToolAdapter>, ToolLoadError>;
}

/// rmcp-backed connector used by the running service.
#[derive(Debug, Clone, Default)]
pub struct RmcpConnector;

impl RmcpConnector {
    pub fn new() -> Self {
        Self
    }

    async fn connect_stdio(params: StdioParams) -> Result<(ClientService, Option<Duration>), ToolLoadError> {
        let mut cmd = Command::new(&params.command);
        cmd.args(&params.args).envs(&params.env).kill_on_drop(true);

        let command = params.command.clone();
        let handshake = async move {
            let transport = TokioChildProcess::new(cmd)
                .map_err(|e| format!("failed to spawn `{}`: {}", command, e))?;
            ().serve(transport).await.map_err(|e| e.to_string())
        };

        let service = within(params.timeout, handshake).await?;
        Ok((service, params.timeout))
    }

    async fn connect_streamable_http(
        params: RemoteParams,
    ) -> Result<(ClientService, Option<Duration>), ToolLoadError> {
        let client = http_client(&params.headers)?;
        let config = StreamableHttpClientTransportConfig::with_uri(params.url.clone());
        let transport = StreamableHttpClientTransport::with_client(client, config);

        let service = within(Some(params.timeout), ().serve(transport)).await?;
        Ok((service, Some(params.timeout)))
    }

    async fn connect_sse(params: RemoteParams) -> Result<(ClientService, Option<Duration>), ToolLoadError> {
        let client = http_client(&params.headers)?;
        let config = SseClientConfig {
            sse_endpoint: params.url.clone().into(),
            ..Default::default()
        };

        let handshake = async move {
            let transport = SseClientTransport::start_with_client(client, config)
                .await
                .map_err(|e| e.to_string())?;
            ().serve(transport).await.map_err(|e| e.to_string())
        };

        let service = within(Some(params.timeout), handshake).await?;
        Ok((service, Some(params.timeout)))
    }

    /// Connects and lists tools, returning the concrete adapter.
    pub async fn open(
        &self,
        server: &McpServer,
        params: TransportParams,
    ) -> Result<RmcpToolAdapter, ToolLoadError> {
        let (service, timeout) = match params {
            TransportParams::Stdio(p) => Self::connect_stdio(p).await?,
            TransportParams::StreamableHttp(p) => Self::connect_streamable_http(p).await?,
            TransportParams::Sse(p) => Self::connect_sse(p).await?,
        };

        let listed = within(timeout, service.list_all_tools()).await;
        let tools = match listed {
            Ok(tools) => tools,
            Err(e) => {
                if let Err(join_err) = service.cancel().await {
                    tracing::warn!("Failed to stop MCP client for {}: {}", server.name, join_err);
                }
                return Err(e);
            }
        };

        let catalog = catalog_from(tools.into_iter().map(|t| (t.name, t.description)));

        tracing::info!(
            "Connected to MCP server {} ({} tools)",
            server.name,
            catalog.len()
        );

        Ok(RmcpToolAdapter {
            server_id: server.id,
            server_name: server.name.clone(),
            catalog,
            service: Mutex::new(Some(service)),
        })
    }
}

#[async_trait]
impl ToolConnector for RmcpConnector {
    async fn connect(
        &self,
        server: &McpServer,
        params: TransportParams,
    ) -> Result<Arc<dyn ToolAdapter>, ToolLoadError> {
        let adapter = self.open(server, params).await?;
        Ok(Arc::new(adapter) as Arc<dyn ToolAdapter>)
    }
}

/// Adapter owning a running rmcp client.
pub struct RmcpToolAdapter {
    server_id: i64,
    server_name: String,
    catalog: ToolCatalog,
    service: Mutex<Option<ClientService>>,
}

impl RmcpToolAdapter {
    pub async fn is_open(&self) -> bool {
        self.service.lock().await.is_some()
    }
}

#[async_trait]
impl ToolAdapter for RmcpToolAdapter {
    fn server_id(&self) -> i64 {
        self.server_id
    }

    fn server_name(&self) -> &str {
        &self.server_name
    }

    fn tool_catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn close(&self) {
        let service = self.service.lock().await.take();
        if let Some(service) = service {
            match service.cancel().await {
                Ok(reason) => {
                    tracing::debug!("Closed MCP client for {}: {:?}", self.server_name, reason)
                }
                Err(e) => tracing::warn!("Failed to close MCP client for {}: {}", self.server_name, e),
            }
        }
    }
}

fn http_client(headers: &std::collections::BTreeMap<String, String>) -> Result<reqwest::Client, ToolLoadError> {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ToolLoadError::malformed("headers", format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ToolLoadError::malformed("headers", format!("{}: {}", name, e)))?;
        header_map.insert(name, value);
    }

    reqwest::Client::builder()
        .default_headers(header_map)
        .build()
        .map_err(|e| ToolLoadError::Connection(format!("failed to build HTTP client: {}", e)))
}

/// Runs `fut`, bounded by `limit` when one is given, mapping every failure to
/// `ToolLoadError::Connection`.
async fn within<T, E, F>(limit: Option<Duration>, fut: F) -> Result<T, ToolLoadError>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let outcome = match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
            ToolLoadError::Connection(format!("timed out after {}s", limit.as_secs()))
        })?,
        None => fut.await,
    };

    outcome.map_err(|e| ToolLoadError::Connection(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolLoadErrorKind;
    use std::collections::BTreeMap;

    #[test]
    fn test_http_client_rejects_invalid_header_name() {
        let headers = BTreeMap::from([("bad header".to_string(), "x".to_string())]);
        match http_client(&headers) {
            Err(e) => assert_eq!(e.kind(), ToolLoadErrorKind::MalformedStoredConfig),
            Ok(_) => panic!("Expected invalid header name to be rejected"),
        }
    }

    #[test]
    fn test_http_client_accepts_auth_header() {
        let headers = BTreeMap::from([("Authorization".to_string(), "Bearer abc".to_string())]);
        assert!(http_client(&headers).is_ok());
    }

    #[tokio::test]
    async fn test_within_times_out() {
        let result: Result<(), ToolLoadError> = within(
            Some(Duration::from_millis(10)),
            async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<(), String>(())
            },
        )
        .await;

        match result {
            Err(ToolLoadError::Connection(msg)) => assert!(msg.contains("timed out")),
            other => panic!("Expected timeout, got: {:?}", other),
        }
    }
}
