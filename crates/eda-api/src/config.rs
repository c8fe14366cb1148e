//! Service configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `EDA_API_HOST` | `127.0.0.1` |
//! | `EDA_API_PORT` | `8000` |
//! | `EDA_API_READINESS_THRESHOLD` | `0.7` |
//! | `EDA_API_MAX_UPLOAD_BYTES` | `16777216` (16 MiB) |

use eda_core::READINESS_THRESHOLD;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use thiserror::Error;

pub const HOST_VAR: &str = "EDA_API_HOST";
pub const PORT_VAR: &str = "EDA_API_PORT";
pub const READINESS_THRESHOLD_VAR: &str = "EDA_API_READINESS_THRESHOLD";
pub const MAX_UPLOAD_BYTES_VAR: &str = "EDA_API_MAX_UPLOAD_BYTES";

/// Default upload limit for the CSV endpoints.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Error, PartialEq)]
pub enum ServiceConfigError {
    #[error("{name}='{value}' is not valid: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Minimum quality score for `ok_for_model`.
    pub readiness_threshold: f64,
    /// Largest accepted request body, for JSON and multipart uploads alike.
    pub max_upload_bytes: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8000,
            readiness_threshold: READINESS_THRESHOLD,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Read the configuration from the process environment.
    ///
    /// Call `dotenv::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ServiceConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Read the configuration through a lookup function; unset variables
    /// keep their defaults.
    pub fn from_vars<F>(get: F) -> Result<Self, ServiceConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            host: parse_var(&get, HOST_VAR)?.unwrap_or(defaults.host),
            port: parse_var(&get, PORT_VAR)?.unwrap_or(defaults.port),
            readiness_threshold: parse_var(&get, READINESS_THRESHOLD_VAR)?
                .unwrap_or(defaults.readiness_threshold),
            max_upload_bytes: parse_var(&get, MAX_UPLOAD_BYTES_VAR)?
                .unwrap_or(defaults.max_upload_bytes),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ServiceConfigError> {
        if !(0.0..=1.0).contains(&self.readiness_threshold) {
            return Err(ServiceConfigError::InvalidVar {
                name: READINESS_THRESHOLD_VAR,
                value: self.readiness_threshold.to_string(),
                reason: "must be between 0.0 and 1.0".to_string(),
            });
        }
        if self.max_upload_bytes == 0 {
            return Err(ServiceConfigError::InvalidVar {
                name: MAX_UPLOAD_BYTES_VAR,
                value: "0".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<F, T>(get: &F, name: &'static str) -> Result<Option<T>, ServiceConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(name) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ServiceConfigError::InvalidVar {
                    name,
                    value: raw.clone(),
                    reason: e.to_string(),
                })
        }
    }
}
