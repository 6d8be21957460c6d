use crate::agent::AgentInfo;
use crate::AppState;
use axum::{extract::State, Json};

/// GET /scopex/agent
pub async fn agent_info(State(state): State<AppState>) -> Json<AgentInfo> {
    Json(state.agent.info().await)
}
