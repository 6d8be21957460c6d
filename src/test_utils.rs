pub mod test_helpers {
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when more than one connection must see the same data
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    /// Insert a descriptor row verbatim, bypassing request encoding.
    /// Lets tests store transports and JSON columns the API would never write.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_test_mcp_server(
        pool: &SqlitePool,
        name: &str,
        transport: &str,
        url: Option<&str>,
        command: Option<&str>,
        args: Option<&str>,
        enabled: bool,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO mcp_servers (name, transport, url, command, args, enabled)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(transport)
        .bind(url)
        .bind(command)
        .bind(args)
        .bind(enabled)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}

use crate::error::ToolLoadError;
use crate::mcp::adapter::{catalog_from, ToolAdapter, ToolCatalog};
use crate::mcp::connector::ToolConnector;
use crate::mcp::transport::TransportParams;
use crate::models::McpServer;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory adapter with a fixed catalog. Counts `close()` calls.
pub struct StaticAdapter {
    server_id: i64,
    server_name: String,
    catalog: ToolCatalog,
    closes: AtomicUsize,
}

impl StaticAdapter {
    pub fn new(server_id: i64, server_name: &str, tools: &[&str]) -> Self {
        Self {
            server_id,
            server_name: server_name.to_string(),
            catalog: catalog_from(
                tools
                    .iter()
                    .map(|name| (name.to_string(), Some(format!("{} tool", name)))),
            ),
            closes: AtomicUsize::new(0),
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

#[async_trait]
impl ToolAdapter for StaticAdapter {
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
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted [`ToolConnector`] keyed by endpoint: the command for stdio
/// descriptors, the url for remote ones. Unknown endpoints are unreachable.
#[derive(Default)]
pub struct FakeConnector {
    endpoints: Mutex<HashMap<String, Vec<String>>>,
    opened: Mutex<Vec<Arc<StaticAdapter>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tools(self, endpoint: &str, tools: &[&str]) -> Self {
        self.serve(endpoint, tools);
        self
    }

    /// Makes `endpoint` reachable (or changes its tools) after construction.
    pub fn serve(&self, endpoint: &str, tools: &[&str]) {
        if let Ok(mut endpoints) = self.endpoints.lock() {
            endpoints.insert(
                endpoint.to_string(),
                tools.iter().map(|t| t.to_string()).collect(),
            );
        }
    }

    /// Every adapter this connector has produced, in connection order.
    pub fn opened(&self) -> Vec<Arc<StaticAdapter>> {
        self.opened
            .lock()
            .map(|opened| opened.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ToolConnector for FakeConnector {
    async fn connect(
        &self,
        server: &McpServer,
        params: TransportParams,
    ) -> Result<Arc<dyn ToolAdapter>, ToolLoadError> {
        let endpoint = match &params {
            TransportParams::Stdio(p) => p.command.clone(),
            TransportParams::StreamableHttp(p) | TransportParams::Sse(p) => p.url.clone(),
        };

        let tools = self
            .endpoints
            .lock()
            .ok()
            .and_then(|endpoints| endpoints.get(&endpoint).cloned())
            .ok_or_else(|| ToolLoadError::Connection(format!("{} is unreachable", endpoint)))?;

        let names: Vec<&str> = tools.iter().map(String::as_str).collect();
        let adapter = Arc::new(StaticAdapter::new(server.id, &server.name, &names));
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(Arc::clone(&adapter));
        }

        Ok(adapter as Arc<dyn ToolAdapter>)
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
