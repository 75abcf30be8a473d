//! Processor configuration.
//!
//! Settings come from environment variables, optionally seeded from a `.env`
//! file by the binary:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `DATABASE_URL` | PostgreSQL connection string of the ordering database |
//! | `CHECK_UPDATE_TIME` | seconds between poll cycles |
//! | `GRACE_PERIOD_TIME` | minutes an order may stay `Submitted` |
//! | `DATABASE_MAX_CONNECTIONS` | pool size, defaults to 5 |

use std::time::Duration;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Errors found while loading configuration. All of them are fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is not a valid number: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Timing settings of the grace-period poller. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundTaskOptions {
    check_update_time: Duration,
    grace_period_time: Duration,
}

impl BackgroundTaskOptions {
    /// Builds options from explicit durations. Both must be non-zero.
    pub fn new(check_update_time: Duration, grace_period_time: Duration) -> Result<Self, ConfigError> {
        if check_update_time.is_zero() {
            return Err(ConfigError::Zero("CHECK_UPDATE_TIME"));
        }
        if grace_period_time.is_zero() {
            return Err(ConfigError::Zero("GRACE_PERIOD_TIME"));
        }
        Ok(Self {
            check_update_time,
            grace_period_time,
        })
    }

    /// Builds options from the configured units: seconds between checks and grace period in minutes.
    pub fn from_settings(check_update_secs: u64, grace_period_minutes: u64) -> Result<Self, ConfigError> {
        let grace_period_secs = grace_period_minutes
            .checked_mul(60)
            .ok_or(ConfigError::Invalid {
                name: "GRACE_PERIOD_TIME",
                value: grace_period_minutes.to_string(),
            })?;
        Self::new(
            Duration::from_secs(check_update_secs),
            Duration::from_secs(grace_period_secs),
        )
    }

    /// Delay between the end of one cycle and the start of the next.
    pub fn check_update_time(&self) -> Duration {
        self.check_update_time
    }

    /// Minimum age of a `Submitted` order before it is confirmed.
    pub fn grace_period_time(&self) -> Duration {
        self.grace_period_time
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub options: BackgroundTaskOptions,
}

impl ProcessorConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let check_update_secs = required_number(&lookup, "CHECK_UPDATE_TIME")?;
        let grace_period_minutes = required_number(&lookup, "GRACE_PERIOD_TIME")?;
        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse_number::<u32>("DATABASE_MAX_CONNECTIONS", &value)?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if database_max_connections == 0 {
            return Err(ConfigError::Zero("DATABASE_MAX_CONNECTIONS"));
        }

        Ok(Self {
            database_url,
            database_max_connections,
            options: BackgroundTaskOptions::from_settings(check_update_secs, grace_period_minutes)?,
        })
    }
}

fn required_number(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<u64, ConfigError> {
    let value = lookup(name).ok_or(ConfigError::Missing(name))?;
    parse_number(name, &value)
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
