//! Configuration module with service-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection
//! - `token` - Token signing and rotation policy configuration

pub mod database;
pub mod environment;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use database::DatabaseConfig;
pub use environment::Environment;
pub use token::TokenConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    #[serde(default)]
    pub environment: Environment,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Token signing and rotation configuration
    #[serde(default)]
    pub token: TokenConfig,
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::new("mysql://localhost:3306/token_warden_dev"),
            token: TokenConfig::default(),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::new("mysql://prod-db:3306/token_warden")
                .with_max_connections(50),
            token: TokenConfig::new("use-env-variable"),
        }
    }

    /// Create configuration from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            environment: Environment::from_env(),
            database: DatabaseConfig::from_env(),
            token: TokenConfig::from_env(),
        }
    }

    /// Load layered configuration: environment-specific file first, then
    /// `TW__`-prefixed environment variables on top (e.g. `TW__TOKEN__SECRET`)
    pub fn load() -> Result<Self, ::config::ConfigError> {
        dotenvy::dotenv().ok();
        let environment = Environment::from_env();

        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(environment.config_file()).required(false))
            .add_source(::config::Environment::with_prefix("TW").separator("__"))
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.environment = environment;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.environment.is_development());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.token.refresh_ttl_days, 7);
    }

    #[test]
    fn test_production_config() {
        let config = AppConfig::production();
        assert!(config.environment.is_production());
        assert_eq!(config.database.max_connections, 50);
        assert!(!config.token.is_using_default_secret());
    }
}
