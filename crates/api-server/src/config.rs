//! Service configuration
//!
//! Read from environment variables (optionally seeded from a `.env` file).

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use tasks_core::task::PgStoreConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} is required when STORAGE_MODE=postgres")]
    Missing(&'static str),
}

/// Which backend serves the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Memory,
    Postgres,
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(format!("unknown storage mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub storage_mode: StorageMode,
    /// Items per page on `GET /v1/tasks`
    pub page_size: u32,
    /// Overall budget for one request's repository work
    pub request_timeout: Duration,
    /// Single origin allowed by CORS; credentials are allowed, so never `*`
    pub cors_allow_origin: HeaderValue,
    /// Present only when `storage_mode` is `Postgres`
    pub database: Option<DatabaseConfig>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub store: PgStoreConfig,
    pub ensure_schema: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let host: IpAddr = vars.parse_or("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?;
        let port: u16 = vars.parse_or("LISTEN_PORT", 8080)?;
        let storage_mode: StorageMode = vars.parse_or("STORAGE_MODE", StorageMode::Memory)?;

        let page_size: u32 = vars.parse_or("PAGE_SIZE", 20)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                name: "PAGE_SIZE",
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        let cors_allow_origin = vars
            .get("CORS_ALLOW_ORIGIN")
            .unwrap_or_else(|| "http://localhost:3000".to_string());
        let cors_allow_origin = cors_origin(cors_allow_origin)?;

        let database = match storage_mode {
            StorageMode::Memory => None,
            StorageMode::Postgres => Some(DatabaseConfig::from_vars(&vars)?),
        };

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            storage_mode,
            page_size,
            request_timeout: Duration::from_secs(vars.parse_or("REQUEST_TIMEOUT_SECS", 10)?),
            cors_allow_origin,
            database,
        })
    }
}

fn cors_origin(raw: String) -> Result<HeaderValue, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        name: "CORS_ALLOW_ORIGIN",
        value: raw.clone(),
        reason: reason.to_string(),
    };
    if raw == "*" {
        return Err(invalid("wildcard origin cannot be combined with credentials"));
    }
    HeaderValue::from_str(&raw).map_err(|_| invalid("not a valid header value"))
}

impl DatabaseConfig {
    fn from_vars<F>(vars: &Vars<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store = match vars.get("DATABASE_URL") {
            Some(url) => PgStoreConfig::from_url(&url).map_err(|e| ConfigError::Invalid {
                name: "DATABASE_URL",
                value: "<redacted>".to_string(),
                reason: e.to_string(),
            })?,
            None => {
                let host = vars.require("DB_HOST")?;
                let port: u16 = vars.parse_or("DB_PORT", 5432)?;
                let user = vars.require("DB_USER")?;
                let password = vars.get("DB_PWD").unwrap_or_default();
                let name = vars.require("DB_NAME")?;
                let ssl_mode = vars
                    .get("DB_SSL_MODE")
                    .unwrap_or_else(|| "disable".to_string());
                PgStoreConfig::from_parts(&host, port, &user, &password, &name, &ssl_mode)
                    .map_err(|e| ConfigError::Invalid {
                        name: "DB_SSL_MODE",
                        value: ssl_mode.clone(),
                        reason: e.to_string(),
                    })?
            }
        };

        store.max_connections = vars.parse_or("DB_POOL_MAX_CONNS", store.max_connections)?;
        store.min_connections = vars.parse_or("DB_POOL_MIN_CONNS", store.min_connections)?;
        store.max_lifetime = vars.secs_or("DB_POOL_MAX_CONN_LIFETIME_SECS", store.max_lifetime)?;
        store.idle_timeout = vars.secs_or("DB_POOL_MAX_CONN_IDLE_TIME_SECS", store.idle_timeout)?;
        store.acquire_timeout =
            vars.secs_or("DB_POOL_ACQUIRE_TIMEOUT_SECS", store.acquire_timeout)?;
        store.op_timeout = vars.secs_or("DB_OP_TIMEOUT_SECS", store.op_timeout)?;

        Ok(Self {
            store,
            ensure_schema: vars.flag("DB_ENSURE_SCHEMA", false),
        })
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn require(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn secs_or(&self, name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
        self.parse_or(name, default.as_secs()).map(Duration::from_secs)
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => default,
            },
            None => default,
        }
    }
}
