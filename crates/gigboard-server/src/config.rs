//! Process configuration, read from the environment (after `.env`).

use axum::http::HeaderValue;
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Empty means no cross-origin access.
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, StartupError> {
        let bind = std::env::var("GIGBOARD_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let cors = std::env::var("CORS_ORIGINS").unwrap_or_default();
        Self::parse(&bind, &cors)
    }

    fn parse(bind: &str, cors_origins: &str) -> Result<Self, StartupError> {
        let bind = bind
            .trim()
            .parse()
            .map_err(|e| StartupError::Config(format!("GIGBOARD_BIND {bind:?}: {e}")))?;

        let cors_origins = cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                HeaderValue::from_str(s)
                    .map_err(|_| StartupError::Config(format!("CORS_ORIGINS entry {s:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { bind, cors_origins })
    }
}
