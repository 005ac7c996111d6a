use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Signing secret used when running in development without `JWT_SECRET`.
const DEVELOPMENT_JWT_SECRET: &str = "solar-panel-api-development-secret";

/// Longest accepted token lifetime (100 years).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365 * 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Which `Store` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub min_password_length: usize,
    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set outside development")]
    MissingJwtSecret,

    #[error("DATABASE_URL must be set for the postgres backend")]
    MissingDatabaseUrl,

    #[error("invalid value for {0}")]
    InvalidValue(&'static str),
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "memory" => self.database.backend = StoreBackend::Memory,
                "postgres" | "postgresql" => self.database.backend = StoreBackend::Postgres,
                other => tracing::warn!("Ignoring unknown DATABASE_BACKEND '{}'", other),
            }
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // API overrides
        if let Ok(v) = env::var("API_HOST") {
            self.api.host = v;
        }
        if let Some(port) = env::var("API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS").or_else(|_| env::var("CORS_ORIGINS")) {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_MIN_PASSWORD_LENGTH") {
            self.security.min_password_length = v.parse().unwrap_or(self.security.min_password_length);
        }
        if let Ok(v) = env::var("SECURITY_HASH_MEMORY_KIB") {
            self.security.hash_memory_kib = v.parse().unwrap_or(self.security.hash_memory_kib);
        }
        if let Ok(v) = env::var("SECURITY_HASH_ITERATIONS") {
            self.security.hash_iterations = v.parse().unwrap_or(self.security.hash_iterations);
        }

        self
    }

    /// Reject configurations that must not reach a running server.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if self.security.jwt_expiry_hours == 0 || self.security.jwt_expiry_hours > MAX_JWT_EXPIRY_HOURS {
            return Err(ConfigError::InvalidValue("SECURITY_JWT_EXPIRY_HOURS"));
        }
        if self.security.hash_iterations == 0 {
            return Err(ConfigError::InvalidValue("SECURITY_HASH_ITERATIONS"));
        }
        if self.database.backend == StoreBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8001,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                min_password_length: 6,
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8001,
                enable_request_logging: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                min_password_length: 6,
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 8001,
                enable_request_logging: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7,
                min_password_length: 6,
                hash_memory_kib: 19 * 1024,
                hash_iterations: 2,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(!config.security.jwt_secret.is_empty());
        assert_eq!(config.security.jwt_expiry_hours, 168);
        assert_eq!(config.security.min_password_length, 6);
        assert_eq!(config.security.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_production_requires_secret() {
        let mut config = AppConfig::production();
        config.database.url = Some("postgres://localhost/solar".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::MissingJwtSecret)));

        config.security.jwt_secret = "prod-secret".to_string();
        assert!(config.validate().is_ok());
        assert!(!config.database.run_migrations);
    }

    #[test]
    fn test_postgres_backend_requires_url() {
        let mut config = AppConfig::development();
        assert!(matches!(config.validate(), Err(ConfigError::MissingDatabaseUrl)));

        config.database.backend = StoreBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_expiry_is_rejected() {
        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;
        config.security.jwt_expiry_hours = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue("SECURITY_JWT_EXPIRY_HOURS"))
        ));
    }

    #[test]
    fn test_oversized_expiry_is_rejected() {
        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;

        config.security.jwt_expiry_hours = MAX_JWT_EXPIRY_HOURS;
        assert!(config.validate().is_ok());

        config.security.jwt_expiry_hours = 1_000_000_000_000_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue("SECURITY_JWT_EXPIRY_HOURS"))
        ));
    }
}
