//! services/bot/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use rust_decimal::Decimal;
use shift_log_core::MonthRollover;
use sqlx::postgres::PgConnectOptions;
use std::fmt;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Connection parameters for the entries database.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

// Keeps the password out of logs.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Bearer token every gateway client must present.
    pub gateway_token: String,
    /// The browser origin allowed to call the gateway.
    pub allowed_origin: HeaderValue,
    pub database: DatabaseConfig,
    pub log_level: Level,
    pub authorized_users: Vec<String>,
    pub hourly_rate: Decimal,
    pub rollover: MonthRollover,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("gateway_token", &"***")
            .field("allowed_origin", &self.allowed_origin)
            .field("database", &self.database)
            .field("log_level", &self.log_level)
            .field("authorized_users", &self.authorized_users)
            .field("hourly_rate", &self.hourly_rate)
            .field("rollover", &self.rollover)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };
        let invalid = |key: &str, reason: String| ConfigError::InvalidValue(key.to_string(), reason);

        // --- Server ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| invalid("BIND_ADDRESS", e.to_string()))?;
        let gateway_token = required("GATEWAY_TOKEN")?.trim().to_string();
        let allowed_origin_str =
            lookup("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let allowed_origin = allowed_origin_str
            .trim()
            .parse::<HeaderValue>()
            .map_err(|e| invalid("CORS_ALLOWED_ORIGIN", e.to_string()))?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            invalid(
                "RUST_LOG",
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Access and pay ---
        let authorized_users: Vec<String> = required("AUTHORIZED_USERS")?
            .split(',')
            .map(|u| u.trim().trim_start_matches('@').to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if authorized_users.is_empty() {
            return Err(invalid("AUTHORIZED_USERS", "no usernames listed".to_string()));
        }

        let hourly_rate_str = required("HOURLY_RATE")?;
        let hourly_rate = hourly_rate_str
            .trim()
            .parse::<Decimal>()
            .map_err(|e| invalid("HOURLY_RATE", e.to_string()))?;
        if hourly_rate <= Decimal::ZERO {
            return Err(invalid("HOURLY_RATE", "must be greater than zero".to_string()));
        }

        let rollover = match lookup("PAYROLL_YEAR_AWARE_ROLLOVER").as_deref().map(str::trim) {
            None | Some("") | Some("false") | Some("0") => MonthRollover::LegacyMonthNumber,
            Some("true") | Some("1") => MonthRollover::YearAware,
            Some(other) => {
                return Err(invalid(
                    "PAYROLL_YEAR_AWARE_ROLLOVER",
                    format!("'{}' is not a boolean", other),
                ))
            }
        };

        // --- Database ---
        let port = match lookup("DB_PORT") {
            Some(p) => p.trim().parse::<u16>().map_err(|e| invalid("DB_PORT", e.to_string()))?,
            None => 5432,
        };
        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(n) => n
                .trim()
                .parse::<u32>()
                .map_err(|e| invalid("DB_MAX_CONNECTIONS", e.to_string()))?,
            None => 5,
        };
        let database = DatabaseConfig {
            host: required("DB_HOST")?,
            port,
            user: required("DB_USER")?,
            password: required("DB_PASSWORD")?,
            name: required("DB_NAME")?,
            max_connections,
        };

        Ok(Self {
            bind_address,
            gateway_token,
            allowed_origin,
            database,
            log_level,
            authorized_users,
            hourly_rate,
            rollover,
        })
    }
}
