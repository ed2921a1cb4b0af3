use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Secret used to verify access tokens issued by the auth provider (HS256).
    pub jwt_secret: String,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
    /// Directory uploaded images are written to and served from.
    pub uploads_dir: String,
    /// Base URL under which `uploads_dir` is reachable.
    pub public_base_url: String,
    /// Largest accepted upload, in bytes.
    pub upload_max_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} must be a valid {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

fn parsed_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        None => Ok(default),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any name-to-value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parsed_or(&lookup, "PORT", "u16", 3030u16)?;
        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: required(&lookup, "DATABASE_URL")?,
            db_max_connections: parsed_or(&lookup, "DB_MAX_CONNECTIONS", "u32", 20)?,
            db_min_connections: parsed_or(&lookup, "DB_MIN_CONNECTIONS", "u32", 5)?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            event_bus_capacity: parsed_or(&lookup, "EVENT_BUS_CAPACITY", "usize", 1024)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            uploads_dir: lookup("UPLOADS_DIR").unwrap_or_else(|| "./uploads".to_string()),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| format!("http://localhost:{port}/uploads")),
            upload_max_bytes: parsed_or(&lookup, "UPLOAD_MAX_BYTES", "usize", 10 * 1024 * 1024)?,
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Configuration for in-process tests.
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: String::new(),
            db_max_connections: 1,
            db_min_connections: 1,
            jwt_secret: "test-secret".to_string(),
            event_bus_capacity: 16,
            log_level: "debug".to_string(),
            uploads_dir: "./uploads".to_string(),
            public_base_url: "http://cdn.test/uploads".to_string(),
            upload_max_bytes: 1024,
        }
    }
}
