use crate::{handlers, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Builds the HTTP application.
///
/// `cors_origins` lists the allowed browser origins; an empty list allows any.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route(
            "/mcps",
            get(handlers::list_mcp_servers).post(handlers::create_mcp_server),
        )
        // Static segments before /mcps/{id}
        .route("/mcps/reload", post(handlers::reload_mcp_servers))
        .route("/mcps/catalog", get(handlers::mcp_catalog))
        .route(
            "/mcps/{id}",
            get(handlers::get_mcp_server)
                .put(handlers::update_mcp_server)
                .delete(handlers::delete_mcp_server),
        )
        .route("/tools/available", get(handlers::available_tools))
        .route(
            "/tools",
            get(handlers::list_custom_tools).post(handlers::create_custom_tool),
        )
        .route("/tools/{id}", delete(handlers::delete_custom_tool))
        .route("/agent", get(handlers::agent_info));

    Router::new()
        .nest("/scopex", api)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
