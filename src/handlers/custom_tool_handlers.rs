use crate::error::AppError;
use crate::models::{CustomTool, CustomToolInput};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct AvailableTool {
    pub name: String,
    pub description: String,
    pub source: String,
    pub server: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableTools {
    pub tools: Vec<AvailableTool>,
}

/// GET /scopex/tools/available - Tools the agent can currently call
pub async fn available_tools(State(state): State<AppState>) -> Json<AvailableTools> {
    let installed = state.agent.tools().await;

    let tools = installed
        .iter()
        .flat_map(|adapter| {
            adapter
                .tool_catalog()
                .iter()
                .map(|(name, info)| AvailableTool {
                    name: name.clone(),
                    description: info.description.clone(),
                    source: info.source.clone(),
                    server: adapter.server_name().to_string(),
                })
                .collect::<Vec<_>>()
        })
        .collect();

    Json(AvailableTools { tools })
}

/// GET /scopex/tools
pub async fn list_custom_tools(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomTool>>, AppError> {
    let tools = state.custom_tool_repository.list_all().await?;
    Ok(Json(tools))
}

/// POST /scopex/tools
pub async fn create_custom_tool(
    State(state): State<AppState>,
    Json(input): Json<CustomToolInput>,
) -> Result<Json<CustomTool>, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("Tool name cannot be empty".to_string()));
    }

    let tool = state.custom_tool_repository.create(&input).await?;
    Ok(Json(tool))
}

/// DELETE /scopex/tools/{id}
pub async fn delete_custom_tool(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    if !state.custom_tool_repository.delete(id).await? {
        return Err(AppError::NotFound("Tool".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}
