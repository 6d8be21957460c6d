use scopex::{agent::ChatAgent, config::AppConfig, db, mcp::RmcpConnector, routes, AppState};

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scopex=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    // Database connection
    let pool = db::create_pool(&config.database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    let agent = ChatAgent::new(&config.agent_id, &config.agent_name, &config.model_provider);
    let app_state = AppState::new(pool, agent, Arc::new(RmcpConnector::new()));

    // Attach tools from every enabled server before accepting requests
    tracing::info!(
        "Loading MCP servers into agent {} ({})...",
        app_state.agent.name(),
        app_state.agent.id()
    );
    match app_state.reconciler.reconcile().await {
        Ok(report) => {
            tracing::info!("Loaded {} MCP servers", report.installed_count);
            for failure in &report.errors {
                tracing::warn!(
                    "MCP server {} ({}) not loaded: {}",
                    failure.server_name,
                    failure.server_id,
                    failure.message
                );
            }
        }
        Err(e) => tracing::warn!("Failed to load MCP servers: {}", e),
    }

    let app = routes::app(app_state.clone(), &config.cors_origins);

    // Start server
    let addr = config.bind_addr();
    tracing::info!("Server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app_state.reconciler.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
