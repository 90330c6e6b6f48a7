//! Process configuration read from the environment.
//!
//! Recognised variables:
//!
//! | Variable             | Default     | Meaning                                  |
//! |----------------------|-------------|------------------------------------------|
//! | `STORAGE_MODE`       | `in_memory` | `in_memory` or `postgres`                |
//! | `DATABASE_URL`       |             | Connection string; required for postgres |
//! | `DATABASE_POOL_SIZE` | `8`         | Maximum pooled connections               |
//! | `HOST`               | `0.0.0.0`   | Listen address                           |
//! | `PORT`               | `4000`      | Listen port                              |

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_PORT: u16 = 4000;

/// Backing store for both collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    /// Process-local maps; data is lost on exit.
    #[default]
    InMemory,
    /// `PostgreSQL` JSONB document tables.
    Postgres,
}

impl StorageMode {
    /// Returns the configuration spelling of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InMemory => "in_memory",
            Self::Postgres => "postgres",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = ConfigurationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "in_memory" | "memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(ConfigurationError::InvalidValue {
                variable: "STORAGE_MODE",
                value: raw.to_owned(),
            }),
        }
    }
}

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A variable holds a value that cannot be parsed.
    #[error("invalid value for {variable}: {value:?}")]
    InvalidValue {
        /// Environment variable name.
        variable: &'static str,
        /// Offending value.
        value: String,
    },

    /// A variable required by the selected storage mode is unset.
    #[error("{variable} must be set when STORAGE_MODE={mode}")]
    Missing {
        /// Environment variable name.
        variable: &'static str,
        /// Storage mode that requires it.
        mode: StorageMode,
    },
}

/// Resolved service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Selected backing store.
    pub storage: StorageMode,
    /// Database connection string, present in postgres mode.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub pool_size: u32,
    /// Listen address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
}

impl AppConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a value is malformed or a required
    /// variable is missing.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when a value is malformed or a required
    /// variable is missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let storage = read("STORAGE_MODE")
            .map(|raw| raw.parse::<StorageMode>())
            .transpose()?
            .unwrap_or_default();
        let database_url = read("DATABASE_URL");
        if storage == StorageMode::Postgres && database_url.is_none() {
            return Err(ConfigurationError::Missing {
                variable: "DATABASE_URL",
                mode: storage,
            });
        }

        Ok(Self {
            storage,
            database_url,
            pool_size: parse_or("DATABASE_POOL_SIZE", read("DATABASE_POOL_SIZE"), DEFAULT_POOL_SIZE)?,
            host: parse_or("HOST", read("HOST"), IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or("PORT", read("PORT"), DEFAULT_PORT)?,
        })
    }

    /// Socket address the server binds to.
    #[must_use]
    pub const fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<T: FromStr>(
    variable: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigurationError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue { variable, value })
}
