//! Runtime configuration read from the environment (and `.env`).

use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

use thiserror::Error;

use crate::render::PlaceholderMode;

/// Accepted `DOCUMENT_EXPIRY_DAYS`, up to ten years.
pub const EXPIRY_DAYS_RANGE: RangeInclusive<i64> = 1..=3650;

/// Accepted `TEMPLATE_CACHE_TTL_SECS`, up to one day.
pub const CACHE_TTL_SECS_RANGE: RangeInclusive<i64> = 0..=86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Postgres connection string. `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub bind_address: String,
    pub placeholder_mode: PlaceholderMode,
    pub document_expiry_days: i64,
    pub template_cache_ttl: Duration,
    pub default_state: String,
    pub default_company_name: String,
    pub default_city: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_address: "0.0.0.0:8080".to_string(),
            placeholder_mode: PlaceholderMode::Strict,
            document_expiry_days: 7,
            template_cache_ttl: Duration::from_secs(600),
            default_state: "BA".to_string(),
            default_company_name: "Locadora de Veículos".to_string(),
            default_city: "Salvador".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let placeholder_mode = match env::var("PLACEHOLDER_MODE") {
            Ok(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PLACEHOLDER_MODE",
                value,
            })?,
            Err(_) => defaults.placeholder_mode,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            bind_address: env::var("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            placeholder_mode,
            document_expiry_days: parse_number("DOCUMENT_EXPIRY_DAYS", EXPIRY_DAYS_RANGE)?
                .unwrap_or(defaults.document_expiry_days),
            template_cache_ttl: parse_number("TEMPLATE_CACHE_TTL_SECS", CACHE_TTL_SECS_RANGE)?
                .map(|secs| Duration::from_secs(secs as u64))
                .unwrap_or(defaults.template_cache_ttl),
            default_state: env::var("DEFAULT_STATE").unwrap_or(defaults.default_state),
            default_company_name: env::var("DEFAULT_COMPANY_NAME")
                .unwrap_or(defaults.default_company_name),
            default_city: env::var("DEFAULT_CITY").unwrap_or(defaults.default_city),
        })
    }
}

fn parse_number(
    key: &'static str,
    range: RangeInclusive<i64>,
) -> Result<Option<i64>, ConfigError> {
    match env::var(key) {
        Ok(value) => number_in_range(key, value, &range).map(Some),
        Err(_) => Ok(None),
    }
}

fn number_in_range(
    key: &'static str,
    value: String,
    range: &RangeInclusive<i64>,
) -> Result<i64, ConfigError> {
    match value.trim().parse::<i64>() {
        Ok(n) if range.contains(&n) => Ok(n),
        _ => Err(ConfigError::InvalidValue { key, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.document_expiry_days, 7);
        assert_eq!(config.placeholder_mode, PlaceholderMode::Strict);
        assert!(config.database_url.is_none());
        assert_eq!(config.default_state, "BA");
        assert!(EXPIRY_DAYS_RANGE.contains(&config.document_expiry_days));
    }

    #[test]
    fn test_expiry_days_are_bounded() {
        let parse = |value: &str| {
            number_in_range("DOCUMENT_EXPIRY_DAYS", value.to_string(), &EXPIRY_DAYS_RANGE)
        };
        assert_eq!(parse(" 30 ").unwrap(), 30);
        assert_eq!(parse("3650").unwrap(), 3650);
        for value in ["0", "-1", "3651", "1000000000", "sete"] {
            match parse(value) {
                Err(ConfigError::InvalidValue { key, .. }) => {
                    assert_eq!(key, "DOCUMENT_EXPIRY_DAYS")
                }
                Ok(n) => panic!("{value} accepted as {n}"),
            }
        }
    }
}
