use std::env;
use std::net::{IpAddr, SocketAddr};

use tracing::warn;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/scopex.db?mode=rwc";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Process configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Allowed CORS origins. Empty means any origin.
    pub cors_origins: Vec<String>,
    pub agent_id: String,
    pub agent_name: String,
    pub model_provider: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host_raw = env_or("HOST", "0.0.0.0");
        let host = host_raw
            .parse::<IpAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "HOST",
                value: host_raw.clone(),
            })?;

        let port_raw = env_or("PORT", "7777");
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value: port_raw.clone(),
            })?;

        let cors_origins = parse_origins(&env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGIN));
        if cors_origins.is_empty() {
            warn!("CORS_ORIGINS is empty; allowing any origin");
        }

        Ok(AppConfig {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            host,
            port,
            cors_origins,
            agent_id: env_or("AGENT_ID", "scopex-agent"),
            agent_name: env_or("AGENT_NAME", "ScopeX Assistant"),
            model_provider: env_or("MODEL_PROVIDER", "openai"),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
