//! Client configuration, read from the environment.
//!
//! - `SQUARE_ACCESS_TOKEN` (required)
//! - `SQUARE_ENVIRONMENT`: `sandbox` (default) or `production`
//! - `SQUARE_BASE_URL`: overrides the URL implied by `SQUARE_ENVIRONMENT`
//! - `SQUARE_VERSION`: API version header (default [`DEFAULT_API_VERSION`])
//!
//! The binary loads a `.env` file first, if there is one.

use secrecy::SecretString;

use std::{str::FromStr, time::Duration};

use crate::error::{Error, Result};

pub const DEFAULT_API_VERSION: &str = "2024-01-18";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://connect.squareupsandbox.com",
            Self::Production => "https://connect.squareup.com",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Self::Sandbox),
            "production" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "SQUARE_ENVIRONMENT must be 'sandbox' or 'production', not {other:?}"
            ))),
        }
    }
}

/// Connection settings for [`crate::SquareClient`].
///
/// The access token is never printed by the `Debug` implementation.
#[derive(Clone, Debug)]
pub struct Config {
    pub access_token: SecretString,
    pub environment: Environment,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the access token is missing, or
    /// `SQUARE_ENVIRONMENT` has an unknown value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration using `lookup` to fetch each variable.
    ///
    /// # Errors
    ///
    /// As for [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let access_token = lookup("SQUARE_ACCESS_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("SQUARE_ACCESS_TOKEN is not set".into()))?;
        let environment = match lookup("SQUARE_ENVIRONMENT") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };
        let base_url = lookup("SQUARE_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| environment.base_url().to_string());
        let api_version =
            lookup("SQUARE_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        Ok(Self {
            access_token: SecretString::from(access_token),
            environment,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
