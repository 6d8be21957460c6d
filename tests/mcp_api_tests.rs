use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use scopex::{
    agent::ChatAgent, routes, test_utils::test_helpers, test_utils::FakeConnector, AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn setup(connector: FakeConnector) -> (Router, AppState) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let agent = ChatAgent::new("test-agent", "Test Agent", "openai");
    let state = AppState::new(pool, agent, Arc::new(connector));
    (routes::app(state.clone(), &[]), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_created_server_tools_are_available_without_reload() {
    let (app, _) = setup(FakeConnector::new().with_tools("mcp-fs", &["read_file", "write_file"])).await;

    let (status, created) = send(
        &app,
        "POST",
        "/scopex/mcps",
        Some(json!({
            "name": "filesystem",
            "transport": "stdio",
            "command": "mcp-fs",
            "args": ["--root", "/tmp"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "filesystem");
    assert_eq!(created["args"], json!(["--root", "/tmp"]));
    assert_eq!(created["timeout"], 30);
    assert_eq!(created["enabled"], true);

    let (status, body) = send(&app, "GET", "/scopex/tools/available", None).await;
    assert_eq!(status, StatusCode::OK);
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 2);
    assert_eq!(tools[0]["name"], "read_file");
    assert_eq!(tools[0]["source"], "MCP Tool");
    assert_eq!(tools[0]["server"], "filesystem");
}

#[tokio::test]
async fn test_list_get_update_delete() {
    let (app, state) = setup(FakeConnector::new()).await;

    let (_, created) = send(
        &app,
        "POST",
        "/scopex/mcps",
        Some(json!({ "name": "search", "url": "http://search.local/mcp" })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["transport"], "streamable-http");

    let (status, list) = send(&app, "GET", "/scopex/mcps", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/scopex/mcps/{}", id),
        Some(json!({
            "name": "search-v2",
            "url": "http://search.local/v2/mcp",
            "headers": { "Authorization": "Bearer abc" },
            "enabled": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "search-v2");
    assert_eq!(updated["headers"]["Authorization"], "Bearer abc");

    let (status, fetched) = send(&app, "GET", &format!("/scopex/mcps/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["enabled"], false);

    let (status, body) = send(&app, "DELETE", &format!("/scopex/mcps/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _) = send(&app, "GET", &format!("/scopex/mcps/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(state.agent.tools().await.is_empty());
}

#[tokio::test]
async fn test_missing_server_returns_404() {
    let (app, _) = setup(FakeConnector::new()).await;

    let (status, body) = send(&app, "GET", "/scopex/mcps/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].as_str().unwrap().contains("not found"));

    let (status, _) = send(&app, "DELETE", "/scopex/mcps/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        "/scopex/mcps/999",
        Some(json!({ "name": "ghost", "url": "http://ghost.local" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let (app, _) = setup(FakeConnector::new()).await;

    let (status, body) = send(
        &app,
        "POST",
        "/scopex/mcps",
        Some(json!({ "name": "   ", "url": "http://search.local/mcp" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (_, list) = send(&app, "GET", "/scopex/mcps", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (app, _) = setup(FakeConnector::new()).await;

    let (status, _) = send(&app, "POST", "/scopex/mcps", Some(json!({ "url": "x" }))).await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_reload_applies_update() {
    let connector = Arc::new(FakeConnector::new().with_tools("mcp-fs", &["read_file"]));
    let pool = test_helpers::create_test_db().await.unwrap();
    let state = AppState::new(
        pool,
        ChatAgent::new("test-agent", "Test Agent", "openai"),
        connector.clone(),
    );
    let app = routes::app(state.clone(), &[]);

    let (_, created) = send(
        &app,
        "POST",
        "/scopex/mcps",
        Some(json!({ "name": "filesystem", "transport": "stdio", "command": "mcp-fs" })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    // The update alone keeps the old tools attached
    connector.serve("mcp-fs-v2", &["read_file", "search_files"]);
    send(
        &app,
        "PUT",
        &format!("/scopex/mcps/{}", id),
        Some(json!({ "name": "filesystem", "transport": "stdio", "command": "mcp-fs-v2" })),
    )
    .await;
    let (_, body) = send(&app, "GET", "/scopex/tools/available", None).await;
    assert_eq!(body["tools"].as_array().unwrap().len(), 1);

    let (status, report) = send(&app, "POST", "/scopex/mcps/reload", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["installed_count"], 1);
    assert_eq!(report["errors"], json!([]));

    let (_, body) = send(&app, "GET", "/scopex/tools/available", None).await;
    assert_eq!(body["tools"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reload_store_failure_returns_500() {
    let (app, state) = setup(FakeConnector::new()).await;

    state.pool.close().await;
    let (status, body) = send(&app, "POST", "/scopex/mcps/reload", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_catalog_reports_tools_and_failures() {
    let (app, state) = setup(FakeConnector::new().with_tools("mcp-fs", &["read_file"])).await;
    test_helpers::insert_test_mcp_server(
        &state.pool,
        "filesystem",
        "stdio",
        None,
        Some("mcp-fs"),
        None,
        true,
    )
    .await
    .unwrap();
    test_helpers::insert_test_mcp_server(
        &state.pool,
        "legacy",
        "websocket",
        Some("ws://legacy.local"),
        None,
        None,
        true,
    )
    .await
    .unwrap();

    let (status, body) = send(&app, "GET", "/scopex/mcps/catalog", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["servers"][0]["server_name"], "filesystem");
    assert_eq!(body["servers"][0]["tools"][0]["name"], "read_file");
    assert_eq!(body["errors"][0]["server_name"], "legacy");
    assert_eq!(body["errors"][0]["kind"], "unsupported_transport_kind");
    // Listing the catalog never installs anything
    assert!(state.agent.tools().await.is_empty());
}

#[tokio::test]
async fn test_agent_info() {
    let (app, _) = setup(FakeConnector::new().with_tools("mcp-fs", &["read_file", "write_file"])).await;
    send(
        &app,
        "POST",
        "/scopex/mcps",
        Some(json!({ "name": "filesystem", "transport": "stdio", "command": "mcp-fs" })),
    )
    .await;

    let (status, body) = send(&app, "GET", "/scopex/agent", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "test-agent");
    assert_eq!(body["model_provider"], "openai");
    assert_eq!(body["servers"], json!(["filesystem"]));
    assert_eq!(body["tool_count"], 2);
}

#[tokio::test]
async fn test_custom_tools_crud() {
    let (app, state) = setup(FakeConnector::new()).await;

    let (status, created) = send(
        &app,
        "POST",
        "/scopex/tools",
        Some(json!({ "name": "weather", "config": "{\"city\":\"Lyon\"}" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["enabled"], true);
    let id = created["id"].as_i64().unwrap();

    let (_, list) = send(&app, "GET", "/scopex/tools", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    // Custom tools are never attached to the agent
    assert!(state.agent.tools().await.is_empty());

    let (status, body) = send(&app, "DELETE", &format!("/scopex/tools/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, _) = send(&app, "DELETE", &format!("/scopex/tools/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
