//! Environment-driven settings for the dispatch server.
//!
//! Settings are read through [`mockable::Env`] so the parsing rules can be
//! exercised without touching the process environment.

use std::net::SocketAddr;
use std::str::FromStr;

use mockable::Env;

const BIND_ADDR_ENV: &str = "DISPATCH_BIND_ADDR";
const PORT_ENV: &str = "PORT";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const REDIS_URL_ENV: &str = "REDIS_URL";
const RATE_LIMIT_ENV: &str = "RATE_LIMIT_PER_MINUTE";
const PERSISTENCE_CONCURRENCY_ENV: &str = "PERSISTENCE_CONCURRENCY";
const LOCATIONS_CHANNEL_ENV: &str = "LOCATIONS_CHANNEL";

const DEFAULT_RATE_LIMIT: u32 = 100;
const DEFAULT_PERSISTENCE_CONCURRENCY: u32 = 64;
const DEFAULT_LOCATIONS_CHANNEL: &str = "locations";

/// Errors raised while reading server settings.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl SettingsError {
    fn invalid(name: &'static str, value: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidEnv {
            name,
            value: value.into(),
            expected,
        }
    }
}

/// Settings that shape the server's adapters and admission limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
    pub(crate) redis_url: Option<String>,
    pub(crate) rate_limit_per_minute: u32,
    pub(crate) persistence_concurrency: u32,
    pub(crate) locations_channel: String,
}

impl DispatchSettings {
    /// Read settings from the environment.
    ///
    /// Unset variables fall back to their defaults; blank values count as
    /// unset. `PORT` replaces only the port of the bind address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidEnv`] naming the first variable that
    /// fails to parse.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, SettingsError> {
        let mut bind_addr = match non_blank(env, BIND_ADDR_ENV) {
            Some(value) => parse_value(BIND_ADDR_ENV, value, "host:port")?,
            None => default_bind_addr(),
        };
        if let Some(value) = non_blank(env, PORT_ENV) {
            let port: u16 = parse_value(PORT_ENV, value, "a TCP port number")?;
            bind_addr.set_port(port);
        }

        let rate_limit_per_minute = positive_u32(env, RATE_LIMIT_ENV, DEFAULT_RATE_LIMIT)?;
        let persistence_concurrency = positive_u32(
            env,
            PERSISTENCE_CONCURRENCY_ENV,
            DEFAULT_PERSISTENCE_CONCURRENCY,
        )?;
        let locations_channel = non_blank(env, LOCATIONS_CHANNEL_ENV)
            .unwrap_or_else(|| DEFAULT_LOCATIONS_CHANNEL.to_owned());

        Ok(Self {
            bind_addr,
            database_url: non_blank(env, DATABASE_URL_ENV),
            redis_url: non_blank(env, REDIS_URL_ENV),
            rate_limit_per_minute,
            persistence_concurrency,
            locations_channel,
        })
    }

    /// Socket address the HTTP server binds to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Whether a PostgreSQL connection string was supplied.
    #[must_use]
    pub fn uses_database(&self) -> bool {
        self.database_url.is_some()
    }

    /// Whether a Redis connection string was supplied.
    #[must_use]
    pub fn uses_redis(&self) -> bool {
        self.redis_url.is_some()
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn non_blank<E: Env>(env: &E, name: &str) -> Option<String> {
    env.string(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_value<T: FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, SettingsError> {
    value
        .parse()
        .map_err(|_| SettingsError::invalid(name, value, expected))
}

fn positive_u32<E: Env>(env: &E, name: &'static str, default: u32) -> Result<u32, SettingsError> {
    let Some(value) = non_blank(env, name) else {
        return Ok(default);
    };
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(SettingsError::invalid(name, value, "a positive integer")),
    }
}
