// Process configuration read once at startup.
//
// Responsibilities
// - Read the listen address, log filter and serializer timeout from the environment.
// - Fall back to defaults for absent or blank variables and reject malformed ones.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub log_filter: String,
    pub operation_timeout: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            log_filter: "info".into(),
            operation_timeout: None,
        }
    }
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    ///
    /// - `APP_HOST`: listen host, `0.0.0.0` by default
    /// - `APP_PORT`: listen port, `8080` by default
    /// - `LOG_FILTER`: tracing filter used when `RUST_LOG` is unset, `info` by default
    /// - `SERIALIZER_OPERATION_TIMEOUT_MS`: upper bound for one serialized update, unbounded if unset
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match read("APP_PORT") {
            Some(value) => parse_number::<u16>("APP_PORT", value)?,
            None => defaults.port,
        };
        let operation_timeout = match read("SERIALIZER_OPERATION_TIMEOUT_MS") {
            Some(value) => {
                let millis = parse_number::<u64>("SERIALIZER_OPERATION_TIMEOUT_MS", value)?;
                if millis == 0 {
                    return Err(ConfigError::Zero {
                        name: "SERIALIZER_OPERATION_TIMEOUT_MS",
                    });
                }
                Some(Duration::from_millis(millis))
            }
            None => None,
        };

        Ok(Self {
            host: read("APP_HOST").unwrap_or(defaults.host),
            port,
            log_filter: read("LOG_FILTER").unwrap_or(defaults.log_filter),
            operation_timeout,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::NotANumber { name, value })
}
