//! Process configuration read from the environment.
//!
//! Variables:
//!   DATABASE_URL       - PostgreSQL URL (default: "postgres://localhost/cloudnotes")
//!   HOST / PORT        - listen address (default: "0.0.0.0" / 3000)
//!   JWT_SECRET         - session signing secret, required, at least 32 bytes
//!   SESSION_TTL_SECS   - session lifetime in seconds, at most 30 days (default: 3600)
//!   ALLOWED_ORIGINS    - comma-separated CORS whitelist (default: "http://localhost:5173")
//!   DB_MAX_CONNECTIONS - pool size (default: 10)
//!   DB_ACQUIRE_TIMEOUT_SECS - wait for a free connection (default: 30)
//!   RUN_MIGRATIONS     - apply migrations on startup (default: true)

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use cloudnotes_auth::{DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS, MIN_SECRET_LENGTH};
use cloudnotes_core::{Error, Result};
use cloudnotes_db::pool::{DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS};
use cloudnotes_db::PoolConfig;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/cloudnotes";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";

#[derive(Clone)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub session_ttl_secs: i64,
    pub allowed_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("allowed_origins", &self.allowed_origins)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("run_migrations", &self.run_migrations)
            .finish()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("JWT_SECRET must be set".to_string()))?;
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            return Err(Error::Config(format!(
                "JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LENGTH
            )));
        }

        let session_ttl_secs = parse_or(&get, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        if !(1..=MAX_SESSION_TTL_SECS).contains(&session_ttl_secs) {
            return Err(Error::Config(format!(
                "SESSION_TTL_SECS must be between 1 and {}",
                MAX_SESSION_TTL_SECS
            )));
        }

        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(Error::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        let origins = get("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            jwt_secret,
            session_ttl_secs,
            allowed_origins: split_origins(&origins),
            db_max_connections,
            db_acquire_timeout_secs: parse_or(
                &get,
                "DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            run_migrations: get("RUN_MIGRATIONS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid HOST/PORT: {}", e)))
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("invalid {}: {}", key, e))),
        _ => Ok(default),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
