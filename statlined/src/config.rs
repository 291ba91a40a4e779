//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{ServerError, ServerResult};
use std::env;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// PostgreSQL connection string (required)
    pub database_url: String,

    /// Redis connection string
    pub redis_url: String,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

impl ApiConfig {
    /// Socket address string the server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> ServerResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let host = env::var("STATLINE_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("STATLINE_API_PORT").unwrap_or_else(|_| "8080".to_string());
        let port = port_str
            .parse::<u16>()
            .map_err(|_| ServerError::Config(format!("Invalid STATLINE_API_PORT: {}", port_str)))?;

        let database_url = env::var("DATABASE_URL").map_err(|_| {
            ServerError::Config("DATABASE_URL environment variable is required".to_string())
        })?;

        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        Ok(Self {
            api: ApiConfig { host, port },
            database_url,
            redis_url,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_addr() {
        let api = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8081,
        };
        assert_eq!(api.bind_addr(), "127.0.0.1:8081");
    }
}
