//! Central module for application-wide configuration settings.
//!
//! This module loads the bind address, the server-held token secret, the
//! per-permission token lifetimes and the password hashing cost from
//! environment variables. Every value has a default except the token secret,
//! whose development fallback is accepted with a warning.

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use crate::auth::token::TokenLifetimes;

pub const DEFAULT_TOKEN_SECRET: &str = "access_secret";
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashingConfig {
    /// Upper bound on concurrent hash/verify jobs.
    pub workers: usize,
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashingConfig {
    /// Minimal cost parameters so test suites stay fast.
    pub fn for_tests() -> Self {
        Self {
            workers: 4,
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub token_secret: String,
    pub lifetimes: TokenLifetimes,
    pub hashing: HashingConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "KEYWARD_BIND_ADDR", || {
            SocketAddr::from(([127, 0, 0, 1], 3000))
        })?;

        let token_secret = match lookup("KEYWARD_TOKEN_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ => {
                warn!("KEYWARD_TOKEN_SECRET is not set, falling back to the development secret");
                DEFAULT_TOKEN_SECRET.to_string()
            }
        };

        let lifetimes = TokenLifetimes {
            regular: ttl(&lookup, "KEYWARD_REGULAR_TOKEN_TTL_SECS")?,
            verify_email: ttl(&lookup, "KEYWARD_VERIFY_EMAIL_TOKEN_TTL_SECS")?,
            recover_password: ttl(&lookup, "KEYWARD_RECOVER_PASSWORD_TOKEN_TTL_SECS")?,
        };

        let defaults = HashingConfig::default();
        let hashing = HashingConfig {
            workers: parse_or(&lookup, "KEYWARD_HASH_WORKERS", || defaults.workers)?,
            memory_kib: parse_or(&lookup, "KEYWARD_HASH_MEMORY_KIB", || defaults.memory_kib)?,
            iterations: parse_or(&lookup, "KEYWARD_HASH_ITERATIONS", || defaults.iterations)?,
            parallelism: parse_or(&lookup, "KEYWARD_HASH_PARALLELISM", || defaults.parallelism)?,
        };
        if hashing.workers == 0 {
            return Err(ConfigError::Invalid {
                key: "KEYWARD_HASH_WORKERS",
                value: "0".to_string(),
                reason: "at least one worker is required".to_string(),
            });
        }

        Ok(Self {
            bind_addr,
            token_secret,
            lifetimes,
            hashing,
        })
    }
}

fn parse_or<F, T, D>(lookup: &F, key: &'static str, default: D) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    D: FnOnce() -> T,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|err: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }),
        None => Ok(default()),
    }
}

fn ttl<F>(lookup: &F, key: &'static str) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs: i64 = parse_or(lookup, key, || DEFAULT_TOKEN_TTL_SECS)?;
    if secs < 0 {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "lifetime can not be negative".to_string(),
        });
    }
    Duration::try_seconds(secs).ok_or_else(|| ConfigError::Invalid {
        key,
        value: secs.to_string(),
        reason: "lifetime is out of range".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.token_secret, DEFAULT_TOKEN_SECRET);
        assert_eq!(config.lifetimes.regular, Duration::seconds(3600));
        assert_eq!(config.lifetimes.verify_email, Duration::seconds(3600));
        assert_eq!(config.lifetimes.recover_password, Duration::seconds(3600));
        assert!(config.hashing.workers >= 1);
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("KEYWARD_BIND_ADDR", "0.0.0.0:8080"),
            ("KEYWARD_TOKEN_SECRET", "s3cr3t"),
            ("KEYWARD_REGULAR_TOKEN_TTL_SECS", "60"),
            ("KEYWARD_VERIFY_EMAIL_TOKEN_TTL_SECS", "0"),
            ("KEYWARD_RECOVER_PASSWORD_TOKEN_TTL_SECS", "300"),
            ("KEYWARD_HASH_WORKERS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.token_secret, "s3cr3t");
        assert_eq!(config.lifetimes.regular, Duration::seconds(60));
        assert_eq!(config.lifetimes.verify_email, Duration::zero());
        assert_eq!(config.lifetimes.recover_password, Duration::seconds(300));
        assert_eq!(config.hashing.workers, 2);
    }

    #[test]
    fn test_config_rejects_malformed_numbers() {
        let err = Config::from_lookup(lookup_from(&[("KEYWARD_REGULAR_TOKEN_TTL_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("KEYWARD_REGULAR_TOKEN_TTL_SECS"));

        let err = Config::from_lookup(lookup_from(&[("KEYWARD_VERIFY_EMAIL_TOKEN_TTL_SECS", "-5")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err =
            Config::from_lookup(lookup_from(&[("KEYWARD_HASH_WORKERS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "KEYWARD_HASH_WORKERS", .. }));
    }
}
