use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Where session state is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Redis,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "redis" => Ok(SessionBackend::Redis),
            other => Err(anyhow!(
                "SESSION_BACKEND must be 'memory' or 'redis', got '{other}'"
            )),
        }
    }
}

/// Fully validated session store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreConfig {
    Memory,
    Redis { url: String, ttl_secs: u64 },
}

impl SessionStoreConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            SessionStoreConfig::Memory => "memory",
            SessionStoreConfig::Redis { .. } => "redis",
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub session_store: SessionStoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend: SessionBackend = std::env::var("SESSION_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;
        let ttl_secs = parse_ttl(
            &std::env::var("SESSION_TTL_SECS").unwrap_or_else(|_| "86400".to_string()),
        )?;

        let session_store = match backend {
            SessionBackend::Memory => SessionStoreConfig::Memory,
            SessionBackend::Redis => SessionStoreConfig::Redis {
                url: require_env("REDIS_URL")?,
                ttl_secs,
            },
        };

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_store,
        })
    }
}

/// Redis rejects `EX 0`, so the TTL must be at least one second.
fn parse_ttl(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|t| *t > 0)
        .with_context(|| {
            format!("SESSION_TTL_SECS must be a positive whole number of seconds, got '{raw}'")
        })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_parse_is_case_insensitive() {
        assert_eq!("Redis".parse::<SessionBackend>().unwrap(), SessionBackend::Redis);
        assert_eq!(" memory ".parse::<SessionBackend>().unwrap(), SessionBackend::Memory);
    }

    #[test]
    fn test_backend_parse_rejects_unknown() {
        let err = "postgres".parse::<SessionBackend>().unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_ttl_accepts_positive_seconds() {
        assert_eq!(parse_ttl("3600").unwrap(), 3600);
        assert_eq!(parse_ttl(" 1 ").unwrap(), 1);
    }

    #[test]
    fn test_ttl_rejects_zero() {
        let err = parse_ttl("0").unwrap_err();
        assert!(err.to_string().contains("SESSION_TTL_SECS"));
    }

    #[test]
    fn test_ttl_rejects_malformed() {
        assert!(parse_ttl("-5").is_err());
        assert!(parse_ttl("1h").is_err());
        assert!(parse_ttl("").is_err());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(SessionStoreConfig::Memory.backend_name(), "memory");
        let redis = SessionStoreConfig::Redis {
            url: "redis://localhost".to_string(),
            ttl_secs: 60,
        };
        assert_eq!(redis.backend_name(), "redis");
    }
}
