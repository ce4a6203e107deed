// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the gateway. Configuration is loaded from the environment
//! once at startup; any invalid value stops the process before it binds.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `GATEWAY_SIGNING_KEY` | Base64 HMAC signing key (at least 32 bytes decoded) | Ephemeral |
//! | `GATEWAY_SIGNING_KEY_FILE` | File containing the base64 signing key | Ephemeral |
//! | `ACCESS_TOKEN_TTL_SECS` | Access token lifetime | `900` |
//! | `REFRESH_TOKEN_TTL_SECS` | Refresh token lifetime | `604800` |
//! | `GATEWAY_EXCLUDED_PATHS` | Comma-separated path prefixes that skip auth | `/v1/login,/v1/refresh/token,/health,/webhook` |
//! | `ACCOUNT_SERVICE_URL` | Base URL of the account service | `http://localhost:8081` |
//! | `ACCOUNT_SERVICE_TIMEOUT_SECS` | Account service request timeout | `10` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Without a configured key the gateway generates one at startup. Tokens
//! issued by such a process stop validating when it restarts and are not
//! accepted by other replicas.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use chrono::TimeDelta;
use url::Url;

use crate::auth::{
    issuer::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS},
    policy::DEFAULT_EXCLUDED_PATHS,
    BypassPolicy, KeyError, SigningKey, TokenLifetimes,
};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Base64-encoded signing key. Mutually exclusive with the key file.
pub const SIGNING_KEY_ENV: &str = "GATEWAY_SIGNING_KEY";

/// Path to a file holding the base64-encoded signing key.
///
/// Prefer this over [`SIGNING_KEY_ENV`] when the key comes from a mounted
/// secret.
pub const SIGNING_KEY_FILE_ENV: &str = "GATEWAY_SIGNING_KEY_FILE";

pub const ACCESS_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const REFRESH_TTL_ENV: &str = "REFRESH_TOKEN_TTL_SECS";
pub const EXCLUDED_PATHS_ENV: &str = "GATEWAY_EXCLUDED_PATHS";
pub const ACCOUNT_SERVICE_URL_ENV: &str = "ACCOUNT_SERVICE_URL";
pub const ACCOUNT_SERVICE_TIMEOUT_ENV: &str = "ACCOUNT_SERVICE_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ACCOUNT_SERVICE_URL: &str = "http://localhost:8081";
pub const DEFAULT_ACCOUNT_SERVICE_TIMEOUT_SECS: u64 = 10;

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} and {1} are mutually exclusive")]
    Conflicting(&'static str, &'static str),

    #[error("signing key: {0}")]
    SigningKey(#[from] KeyError),
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Console log format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref())
    }

    /// Unknown values fall back to `Pretty`; logging is not yet up to
    /// report them.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Where the signing key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum KeySource {
    Inline(String),
    File(PathBuf),
    Ephemeral,
}

impl std::fmt::Debug for KeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeySource::Inline(_) => f.write_str("Inline([REDACTED])"),
            KeySource::File(path) => f.debug_tuple("File").field(path).finish(),
            KeySource::Ephemeral => f.write_str("Ephemeral"),
        }
    }
}

impl KeySource {
    pub fn load(&self) -> Result<SigningKey, KeyError> {
        match self {
            KeySource::Inline(encoded) => SigningKey::from_base64(encoded),
            KeySource::File(path) => SigningKey::from_file(path),
            KeySource::Ephemeral => SigningKey::generate(),
        }
    }
}

/// Gateway configuration, parsed once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub key_source: KeySource,
    pub lifetimes: TokenLifetimes,
    pub excluded_paths: Vec<String>,
    pub account_service_url: Url,
    pub account_service_timeout: Duration,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's
    /// value or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let ip: IpAddr = host
            .trim()
            .parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, &host, e))?;
        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, &raw, e))?,
            None => DEFAULT_PORT,
        };

        let key_source = match (get(SIGNING_KEY_ENV), get(SIGNING_KEY_FILE_ENV)) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Conflicting(SIGNING_KEY_ENV, SIGNING_KEY_FILE_ENV))
            }
            (Some(encoded), None) => KeySource::Inline(encoded.trim().to_string()),
            (None, Some(path)) => KeySource::File(PathBuf::from(path.trim())),
            (None, None) => KeySource::Ephemeral,
        };

        let lifetimes = TokenLifetimes {
            access: ttl(ACCESS_TTL_ENV, get(ACCESS_TTL_ENV), DEFAULT_ACCESS_TTL_SECS)?,
            refresh: ttl(REFRESH_TTL_ENV, get(REFRESH_TTL_ENV), DEFAULT_REFRESH_TTL_SECS)?,
        };

        let excluded_paths: Vec<String> = match get(EXCLUDED_PATHS_ENV) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_EXCLUDED_PATHS.iter().map(|p| p.to_string()).collect(),
        };
        for path in &excluded_paths {
            if !path.starts_with('/') {
                return Err(ConfigError::invalid(
                    EXCLUDED_PATHS_ENV,
                    path,
                    "path prefixes must start with '/'",
                ));
            }
        }

        let raw_url =
            get(ACCOUNT_SERVICE_URL_ENV).unwrap_or_else(|| DEFAULT_ACCOUNT_SERVICE_URL.to_string());
        let account_service_url = Url::parse(raw_url.trim())
            .map_err(|e| ConfigError::invalid(ACCOUNT_SERVICE_URL_ENV, &raw_url, e))?;
        if !matches!(account_service_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                ACCOUNT_SERVICE_URL_ENV,
                &raw_url,
                "scheme must be http or https",
            ));
        }

        let timeout_secs = positive_secs(
            ACCOUNT_SERVICE_TIMEOUT_ENV,
            get(ACCOUNT_SERVICE_TIMEOUT_ENV),
            DEFAULT_ACCOUNT_SERVICE_TIMEOUT_SECS as i64,
        )?;

        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            key_source,
            lifetimes,
            excluded_paths,
            account_service_url,
            account_service_timeout: Duration::from_secs(timeout_secs as u64),
        })
    }

    pub fn bypass_policy(&self) -> BypassPolicy {
        BypassPolicy::new(&self.excluded_paths)
    }
}

/// Token lifetime in seconds, bounded by what `TimeDelta` can hold.
fn ttl(var: &'static str, raw: Option<String>, default: i64) -> Result<TimeDelta, ConfigError> {
    let value = raw.clone().unwrap_or_default();
    let secs = positive_secs(var, raw, default)?;
    TimeDelta::try_seconds(secs).ok_or_else(|| ConfigError::invalid(var, &value, "out of range"))
}

fn positive_secs(var: &'static str, raw: Option<String>, default: i64) -> Result<i64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        Ok(_) => Err(ConfigError::invalid(var, &raw, "must be greater than zero")),
        Err(e) => Err(ConfigError::invalid(var, &raw, e)),
    }
}
