//! Server configuration from environment variables.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use tracing::warn;

use odyss_crypto::DEFAULT_TOKEN_TTL_MINUTES;

/// Signing key used when `SECRET_KEY` is not set.
pub const DEV_SECRET_KEY: &str = "odyssvault-secret-key-change-in-production";

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/odyss";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://127.0.0.1:5173";
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Runtime configuration for the API server.
#[derive(Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub token_ttl_minutes: i64,
    pub allowed_origins: Vec<HeaderValue>,
    pub db_max_connections: u32,
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret_key", &"[REDACTED]")
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("allowed_origins", &self.allowed_origins)
            .field("db_max_connections", &self.db_max_connections)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            secret_key: DEV_SECRET_KEY.to_string(),
            token_ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            allowed_origins: parse_allowed_origins(DEFAULT_ALLOWED_ORIGINS),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let secret_key = match lookup("SECRET_KEY").filter(|v| !v.trim().is_empty()) {
            Some(key) => key,
            None => {
                warn!(
                    subsystem = "api",
                    component = "config",
                    "SECRET_KEY not set; using the development signing key"
                );
                defaults.secret_key
            }
        };

        Self {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port),
            secret_key,
            token_ttl_minutes: parse_or(
                &lookup,
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults.token_ttl_minutes,
            ),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_allowed_origins(&v))
                .unwrap_or(defaults.allowed_origins),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections),
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    subsystem = "api",
                    component = "config",
                    key,
                    value = %raw,
                    default = %default,
                    "Invalid value, using default"
                );
                default
            }
        },
    }
}

/// Parse a comma-separated CORS origin list, skipping invalid entries.
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
