//! Configuration management following 12-factor app principles
//!
//! Configuration is loaded from environment variables by the composition
//! root only. Domain services receive their collaborators explicitly and
//! never read the environment themselves.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(anyhow::anyhow!("Unsupported LOG_FORMAT: {}", other)),
        }
    }
}

/// Which identity boundary implementation to wire in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    #[default]
    Mock,
}

impl FromStr for IdentityProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            other => Err(anyhow::anyhow!("Unsupported IDENTITY_PROVIDER: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Tracing filter directive
    pub rust_log: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Identity boundary implementation
    pub identity_provider: IdentityProviderKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rust_log: "info".to_string(),
            log_format: LogFormat::default(),
            identity_provider: IdentityProviderKind::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Self::default();

        let config = Self {
            rust_log: env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            log_format: match env::var("LOG_FORMAT") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.log_format,
            },
            identity_provider: match env::var("IDENTITY_PROVIDER") {
                Ok(value) => value.parse()?,
                Err(_) => defaults.identity_provider,
            },
        };

        Ok(config)
    }
}
