use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub query: QueryConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

/// Bounds applied to the tool listing query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    pub default_limit: u32,
    pub max_limit: u32,
    pub max_search_length: usize,
    pub debug_logging: bool,
}

impl QueryConfig {
    /// Page size used when the request carries no `limit`.
    /// Never larger than `max_limit`, even if misconfigured.
    pub fn effective_default_limit(&self) -> u32 {
        self.default_limit.clamp(1, self.max_limit.max(1))
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
            max_search_length: 200,
            debug_logging: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
    pub enable_slow_query_warning: bool,
    pub slow_query_threshold_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_minutes: u64,
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
        // Query overrides
        if let Ok(v) = env::var("QUERY_DEFAULT_LIMIT") {
            self.query.default_limit = v.parse().unwrap_or(self.query.default_limit);
        }
        if let Ok(v) = env::var("QUERY_MAX_LIMIT") {
            self.query.max_limit = positive_or(&v, self.query.max_limit);
        }
        if let Ok(v) = env::var("QUERY_MAX_SEARCH_LENGTH") {
            self.query.max_search_length = v.parse().unwrap_or(self.query.max_search_length);
        }
        if let Ok(v) = env::var("QUERY_DEBUG_LOGGING") {
            self.query.debug_logging = v.parse().unwrap_or(self.query.debug_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_SLOW_QUERY_WARNING") {
            self.database.enable_slow_query_warning = v.parse().unwrap_or(self.database.enable_slow_query_warning);
        }
        if let Ok(v) = env::var("DATABASE_SLOW_QUERY_THRESHOLD_MS") {
            self.database.slow_query_threshold_ms = v.parse().unwrap_or(self.database.slow_query_threshold_ms);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_MINUTES") {
            self.security.jwt_expiry_minutes = v.parse().unwrap_or(self.security.jwt_expiry_minutes);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            query: QueryConfig {
                default_limit: 20,
                max_limit: 500,
                max_search_length: 200,
                debug_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 100,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:9000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "change-me".to_string(),
                jwt_expiry_minutes: 15,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            query: QueryConfig {
                default_limit: 20,
                max_limit: 250,
                max_search_length: 200,
                debug_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 500,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                // Must come from JWT_SECRET; an empty secret rejects every token
                jwt_secret: String::new(),
                jwt_expiry_minutes: 15,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            query: QueryConfig {
                default_limit: 20,
                max_limit: 100,
                max_search_length: 200,
                debug_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
                enable_slow_query_warning: true,
                slow_query_threshold_ms: 1000,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_minutes: 15,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Parses a strictly positive override; zero or garbage keeps `current`
fn positive_or(raw: &str, current: u32) -> u32 {
    match raw.trim().parse::<u32>() {
        Ok(0) => {
            tracing::warn!("Ignoring zero override, keeping {}", current);
            current
        }
        Ok(v) => v,
        Err(_) => current,
    }
}

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
