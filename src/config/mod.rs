//! Configuration module for the release notes backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::slug::SlugPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Pre-shared key for the admin API (required in production)
    pub api_psk: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Site served when a request does not name one
    pub default_site_id: i64,
    /// Language assigned to translations created without one
    pub default_language: String,
    /// How slugs behave when an entity is renamed
    pub slug_policy: SlugPolicy,
}

/// Invalid configuration value.
#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid {} value: {:?}", self.key, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_psk = lookup("RN_API_PSK").filter(|k| !k.is_empty());

        let db_path = lookup("RN_DB_PATH")
            .unwrap_or_else(|| "./data/releasenotes.sqlite".to_string())
            .into();

        let bind_addr_raw =
            lookup("RN_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let bind_addr = bind_addr_raw.parse().map_err(|_| ConfigError {
            key: "RN_BIND_ADDR",
            value: bind_addr_raw.clone(),
        })?;

        let log_level = lookup("RN_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let default_site_id = match lookup("RN_SITE_ID") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError {
                key: "RN_SITE_ID",
                value: raw,
            })?,
            None => 1,
        };

        let default_language = lookup("RN_DEFAULT_LANGUAGE")
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| "en".to_string());

        let preserve_slugs = match lookup("RN_PRESERVE_SLUGS") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError {
                key: "RN_PRESERVE_SLUGS",
                value: raw,
            })?,
            None => false,
        };
        let slug_policy = if preserve_slugs {
            SlugPolicy::PreserveFirst
        } else {
            SlugPolicy::Recompute
        };

        Ok(Self {
            api_psk,
            db_path,
            bind_addr,
            log_level,
            default_site_id,
            default_language,
            slug_policy,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]).unwrap();

        assert!(config.api_psk.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/releasenotes.sqlite"));
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.default_site_id, 1);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.slug_policy, SlugPolicy::Recompute);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("RN_API_PSK", "secret"),
            ("RN_SITE_ID", "7"),
            ("RN_DEFAULT_LANGUAGE", "DE"),
            ("RN_PRESERVE_SLUGS", "true"),
        ])
        .unwrap();

        assert_eq!(config.api_psk.as_deref(), Some("secret"));
        assert_eq!(config.default_site_id, 7);
        assert_eq!(config.default_language, "de");
        assert_eq!(config.slug_policy, SlugPolicy::PreserveFirst);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config_from(&[("RN_BIND_ADDR", "not-an-address")]).unwrap_err();
        assert_eq!(err.key, "RN_BIND_ADDR");

        let err = config_from(&[("RN_SITE_ID", "main")]).unwrap_err();
        assert_eq!(err.key, "RN_SITE_ID");

        let err = config_from(&[("RN_PRESERVE_SLUGS", "maybe")]).unwrap_err();
        assert_eq!(err.key, "RN_PRESERVE_SLUGS");
    }
}
