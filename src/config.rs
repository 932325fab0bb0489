//! Environment-driven settings for the binaries.
//!
//! `.env` is loaded first when present; real environment variables win over it.
//! Everything except `ADMIN_TOKEN` is read from `TPO_*` variables.

use config::{Config, Environment, Map};
use serde::Deserialize;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;

pub use config::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Per-IP request budget for the API routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub burst: NonZeroU32,
    pub period: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    /// Bearer token for mutating routes; `None` keeps the service read-only
    pub admin_token: Option<String>,
    pub seed_demo: bool,
    /// `None` when `TPO_RATE_LIMIT_BURST=0`
    pub rate_limit: Option<RateLimit>,
    pub api_url: String,
    pub client_timeout: Duration,
}

/// Shape of the environment before the cross-field checks.
#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default = "default_bind_addr")]
    bind_addr: String,
    /// `ADMIN_TOKEN`
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    seed_demo: bool,
    #[serde(default = "default_rate_limit_burst")]
    rate_limit_burst: u32,
    #[serde(default = "default_rate_limit_period_secs")]
    rate_limit_period_secs: u64,
    #[serde(default = "default_api_url")]
    api_url: String,
    #[serde(default = "default_client_timeout_secs")]
    client_timeout_secs: u64,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_rate_limit_burst() -> u32 {
    10
}

fn default_rate_limit_period_secs() -> u64 {
    60
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_client_timeout_secs() -> u64 {
    10
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case outside development.
        let _ = dotenvy::dotenv();
        Self::load(None)
    }

    /// Reads settings from the given variables instead of the process environment.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let raw: RawSettings = Config::builder()
            .add_source(Environment::with_prefix("ADMIN").ignore_empty(true).source(vars.clone()))
            .add_source(Environment::with_prefix("TPO").ignore_empty(true).source(vars))
            .build()?
            .try_deserialize()?;
        raw.check()
    }
}

impl RawSettings {
    fn check(self) -> Result<Settings, ConfigError> {
        let bind_addr = self.bind_addr.trim().parse::<SocketAddr>().map_err(|e| {
            ConfigError::Message(format!("invalid TPO_BIND_ADDR {:?}: {}", self.bind_addr, e))
        })?;

        if self.rate_limit_period_secs == 0 {
            return Err(ConfigError::Message(
                "TPO_RATE_LIMIT_PERIOD_SECS must be at least one second".to_string(),
            ));
        }
        let rate_limit = NonZeroU32::new(self.rate_limit_burst).map(|burst| RateLimit {
            burst,
            period: Duration::from_secs(self.rate_limit_period_secs),
        });

        let api_url = self.api_url.trim().to_string();
        url::Url::parse(&api_url)
            .map_err(|e| ConfigError::Message(format!("invalid TPO_API_URL {:?}: {}", api_url, e)))?;

        Ok(Settings {
            bind_addr,
            admin_token: self
                .token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            seed_demo: self.seed_demo,
            rate_limit,
            api_url,
            client_timeout: Duration::from_secs(self.client_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: Map<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_vars(vars)
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.bind_addr, DEFAULT_BIND_ADDR.parse().unwrap());
        assert_eq!(s.admin_token, None);
        assert!(!s.seed_demo);
        let limit = s.rate_limit.unwrap();
        assert_eq!(limit.burst.get(), 10);
        assert_eq!(limit.period, Duration::from_secs(60));
        assert_eq!(s.api_url, DEFAULT_API_URL);
        assert_eq!(s.client_timeout, Duration::from_secs(10));
    }

    #[test]
    fn values_are_read_from_prefixed_variables() {
        let s = settings(&[
            ("TPO_BIND_ADDR", "0.0.0.0:8080"),
            ("ADMIN_TOKEN", "s3cret"),
            ("TPO_SEED_DEMO", "true"),
            ("TPO_RATE_LIMIT_BURST", "5"),
            ("TPO_RATE_LIMIT_PERIOD_SECS", "30"),
            ("TPO_API_URL", "http://tpo.internal/api"),
            ("TPO_CLIENT_TIMEOUT_SECS", "3"),
        ])
        .unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(s.admin_token.as_deref(), Some("s3cret"));
        assert!(s.seed_demo);
        let limit = s.rate_limit.unwrap();
        assert_eq!(limit.burst.get(), 5);
        assert_eq!(limit.period, Duration::from_secs(30));
        assert_eq!(s.api_url, "http://tpo.internal/api");
        assert_eq!(s.client_timeout, Duration::from_secs(3));
    }

    #[test]
    fn zero_burst_disables_rate_limiting() {
        let s = settings(&[("TPO_RATE_LIMIT_BURST", "0")]).unwrap();
        assert!(s.rate_limit.is_none());
    }

    #[test]
    fn blank_token_means_read_only() {
        let s = settings(&[("ADMIN_TOKEN", "   ")]).unwrap();
        assert_eq!(s.admin_token, None);
    }

    #[test]
    fn malformed_values_are_errors() {
        assert!(settings(&[("TPO_BIND_ADDR", "localhost")]).is_err());
        assert!(settings(&[("TPO_SEED_DEMO", "maybe")]).is_err());
        assert!(settings(&[("TPO_RATE_LIMIT_BURST", "lots")]).is_err());
        assert!(settings(&[("TPO_RATE_LIMIT_PERIOD_SECS", "0")]).is_err());
        assert!(settings(&[("TPO_API_URL", "not a url")]).is_err());
    }
}
