use std::env;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_STATIC_DIR: &str = "frontend/dist";
const DEFAULT_GEOLOCATION_BASE_URL: &str = "http://ip-api.com";
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set (copy .env.example to .env)")]
    MissingVar(String),

    #[error("{0} must be a valid number")]
    ParseInt(String),
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub port: u16,
    pub static_dir: String,
    pub geolocation_base_url: String,
    pub outbound_timeout: Duration,
    pub database_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: require_env("DATABASE_URL")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            port: parse_env("PORT", DEFAULT_PORT)?,
            static_dir: optional_env("STATIC_DIR")
                .unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
            geolocation_base_url: optional_env("GEOLOCATION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEOLOCATION_BASE_URL.to_string()),
            outbound_timeout: Duration::from_secs(parse_env(
                "OUTBOUND_TIMEOUT_SECS",
                DEFAULT_OUTBOUND_TIMEOUT_SECS,
            )?),
            database_max_connections: parse_env(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            )?,
        })
    }
}

/// A required variable; blank values count as missing.
fn require_env(key: &str) -> Result<String, ConfigError> {
    optional_env(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::ParseInt(key.to_string())),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_message_names_the_variable() {
        let err = ConfigError::MissingVar("GEMINI_API_KEY".to_string());
        assert!(err.to_string().starts_with("GEMINI_API_KEY must be set"));
    }

    #[test]
    fn parse_env_falls_back_to_default_when_unset() {
        let port: u16 = parse_env("TOPIZIO_TEST_UNSET_PORT", 4242).expect("default applies");
        assert_eq!(port, 4242);
    }

    #[test]
    fn require_env_rejects_unset_variable() {
        let err = require_env("TOPIZIO_TEST_UNSET_KEY").expect_err("variable is unset");
        assert!(matches!(err, ConfigError::MissingVar(key) if key == "TOPIZIO_TEST_UNSET_KEY"));
    }
}
