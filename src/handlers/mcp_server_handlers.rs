use crate::error::AppError;
use crate::mcp::reconciler::{CatalogReport, ReconcileReport};
use crate::models::{McpServerInput, McpServerView};
use crate::services::ReloadOutcome;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// GET /scopex/mcps - List every stored MCP server
pub async fn list_mcp_servers(
    State(state): State<AppState>,
) -> Result<Json<Vec<McpServerView>>, AppError> {
    let servers = state.mcp_server_service.list().await?;
    Ok(Json(servers))
}

/// POST /scopex/mcps - Create an MCP server and reload the agent's tools
pub async fn create_mcp_server(
    State(state): State<AppState>,
    Json(input): Json<McpServerInput>,
) -> Result<Json<McpServerView>, AppError> {
    let (server, outcome) = state.mcp_server_service.create(input).await?;
    log_reload("creating", server.id, &outcome);

    Ok(Json(server))
}

/// GET /scopex/mcps/{id}
pub async fn get_mcp_server(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<McpServerView>, AppError> {
    let server = state.mcp_server_service.get(id).await?;
    Ok(Json(server))
}

/// PUT /scopex/mcps/{id} - Replace an MCP server (tools are not reloaded)
pub async fn update_mcp_server(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<McpServerInput>,
) -> Result<Json<McpServerView>, AppError> {
    let server = state.mcp_server_service.update(id, input).await?;
    Ok(Json(server))
}

/// DELETE /scopex/mcps/{id} - Delete an MCP server and reload the agent's tools
pub async fn delete_mcp_server(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let outcome = state.mcp_server_service.delete(id).await?;
    log_reload("deleting", id, &outcome);

    Ok(Json(json!({ "ok": true })))
}

/// POST /scopex/mcps/reload - Run a reconciliation pass on demand
pub async fn reload_mcp_servers(
    State(state): State<AppState>,
) -> Result<Json<ReconcileReport>, AppError> {
    let report = state.reconciler.reconcile().await?;
    Ok(Json(report))
}

/// GET /scopex/mcps/catalog - Ask every enabled server for its tools
pub async fn mcp_catalog(State(state): State<AppState>) -> Result<Json<CatalogReport>, AppError> {
    let report = state.reconciler.probe_catalog().await?;
    Ok(Json(report))
}

// Failed reloads are already logged as warnings by the service
fn log_reload(action: &str, id: i64, outcome: &ReloadOutcome) {
    if let Some(report) = outcome.report() {
        tracing::debug!(
            "Reload after {} MCP server {}: {} installed, {} failed",
            action,
            id,
            report.installed_count,
            report.errors.len()
        );
    }
}
