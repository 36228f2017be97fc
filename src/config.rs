use std::{env, net::SocketAddr};

use thiserror::Error;

pub const BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MESSAGE: &str = "Hello DevOps Node!";
pub const DEFAULT_VERSION: &str = "v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub message: String,
    pub version: String,
    pub metrics_enabled: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("METRICS_ENABLED must be one of 1/0, true/false, yes/no, on/off")]
    InvalidMetricsFlag,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source, so tests do not
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_port = lookup("PORT")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        let message = lookup("APP_MESSAGE").unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        let version = lookup("APP_VERSION").unwrap_or_else(|| DEFAULT_VERSION.to_string());
        let metrics_enabled = lookup("METRICS_ENABLED")
            .map(|value| parse_flag(&value).ok_or(ConfigError::InvalidMetricsFlag))
            .transpose()?
            .unwrap_or(false);

        let config = Self {
            bind_addr: BIND_ADDR.to_string(),
            bind_port,
            message,
            version,
            metrics_enabled,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
