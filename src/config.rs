use crate::errors::{AppError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub scheduler: SchedulerConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

/// Defaults for the per-tenant remote API clients. Credentials live on the
/// tenant rows, not here.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub request_timeout_seconds: u64,
    pub user_agent: String,
    /// Refresh the cached OAuth token this many seconds before it expires.
    pub token_grace_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    pub enabled: bool,
    /// How often the background task scans for due tenants.
    pub tick_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_format: String,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        // Determine environment
        let environment = env::var("RMM_SYNC_ENV").unwrap_or_else(|_| "development".to_string());

        // Build configuration
        let config = config::Config::builder()
            // Start with default config
            .add_source(config::File::with_name("config/default"))
            // Add environment-specific config
            .add_source(config::File::with_name(&format!("config/{}", environment)).required(false))
            // Add environment variables with prefix RMM_SYNC
            // e.g., RMM_SYNC__SERVER__PORT=8080
            .add_source(
                config::Environment::with_prefix("RMM_SYNC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        // Deserialize into our Config struct
        config
            .try_deserialize()
            .map_err(|e| AppError::Configuration(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Configuration("Invalid port number".to_string()));
        }

        if self.database.url.is_empty() {
            return Err(AppError::Configuration(
                "Database URL is required".to_string(),
            ));
        }

        if self.remote.request_timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "Remote request timeout must be non-zero".to_string(),
            ));
        }

        if self.scheduler.enabled && self.scheduler.tick_seconds == 0 {
            return Err(AppError::Configuration(
                "Scheduler tick interval must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/rmm_sync".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 5,
                idle_timeout_seconds: 300,
            },
            remote: RemoteConfig {
                request_timeout_seconds: 30,
                user_agent: "rmm-sync/0.1".to_string(),
                token_grace_seconds: 300,
            },
            scheduler: SchedulerConfig {
                enabled: true,
                tick_seconds: 60,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = test_config();
        assert!(config.validate().is_ok());

        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_requires_database_url() {
        let mut config = test_config();
        config.database.url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheduler_tick_must_be_nonzero_when_enabled() {
        let mut config = test_config();
        config.scheduler.tick_seconds = 0;
        assert!(config.validate().is_err());

        config.scheduler.enabled = false;
        assert!(config.validate().is_ok());
    }
}
