//! Process configuration from the environment.
//!
//! `INSTAGRAM_USERNAME` and `INSTAGRAM_PASSWORD` are required; the process
//! refuses to start without them.

use crate::platform::{Credentials, DEFAULT_API_URL};
use crate::session::DEFAULT_LOGIN_TIMEOUT;
use crate::tools::DEFAULT_PROVIDER_TIMEOUT;
use std::time::Duration;

pub const ENV_USERNAME: &str = "INSTAGRAM_USERNAME";
pub const ENV_PASSWORD: &str = "INSTAGRAM_PASSWORD";
pub const ENV_API_URL: &str = "INSTAGRAM_API_URL";
pub const ENV_LOGIN_TIMEOUT: &str = "GRAMSCOPE_LOGIN_TIMEOUT_SECS";
pub const ENV_PROVIDER_TIMEOUT: &str = "GRAMSCOPE_PROVIDER_TIMEOUT_SECS";

/// Configuration errors. Both are fatal at startup.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", .0.join(", "))]
    MissingSettings(Vec<String>),
    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub api_url: String,
    pub login_timeout: Duration,
    pub provider_timeout: Duration,
}

impl Config {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup. Blank values count as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let username = get(ENV_USERNAME);
        let password = get(ENV_PASSWORD);
        let (username, password) = match (username, password) {
            (Some(u), Some(p)) => (u.trim().to_string(), p),
            (u, p) => {
                let mut missing = Vec::new();
                if u.is_none() {
                    missing.push(ENV_USERNAME.to_string());
                }
                if p.is_none() {
                    missing.push(ENV_PASSWORD.to_string());
                }
                return Err(ConfigError::MissingSettings(missing));
            }
        };

        Ok(Self {
            credentials: Credentials { username, password },
            api_url: get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            login_timeout: parse_secs(ENV_LOGIN_TIMEOUT, get(ENV_LOGIN_TIMEOUT))?
                .unwrap_or(DEFAULT_LOGIN_TIMEOUT),
            provider_timeout: parse_secs(ENV_PROVIDER_TIMEOUT, get(ENV_PROVIDER_TIMEOUT))?
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
        })
    }

    /// Apply `--login-timeout` / `--provider-timeout` over the environment.
    pub fn override_timeouts(
        &mut self,
        login_secs: Option<u64>,
        provider_secs: Option<u64>,
    ) -> Result<(), ConfigError> {
        if let Some(secs) = login_secs {
            self.login_timeout = positive_secs("--login-timeout", secs)?;
        }
        if let Some(secs) = provider_secs {
            self.provider_timeout = positive_secs("--provider-timeout", secs)?;
        }
        Ok(())
    }
}

fn positive_secs(key: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a positive number of seconds.
fn parse_secs(key: &str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(secs) => positive_secs(key, secs).map(Some),
        Err(e) => Err(ConfigError::Invalid {
            key: key.to_string(),
            message: format!("'{}' is not a whole number of seconds ({})", value, e),
        }),
    }
}
