// Copyright (c) 2025 - Cowboy AI, Inc.
//! Reconciler configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration parsing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Missing required setting: {0}")]
    Missing(String),
}

/// Bounded polling used to confirm a delete has settled remotely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Lookups performed before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after the first unsuccessful lookup
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,

    /// Upper bound for a single pause
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,

    /// Growth factor applied to the pause after each attempt
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_max_attempts() -> u32 {
    10
}

fn default_initial_interval_ms() -> u64 {
    500
}

fn default_max_interval_ms() -> u64 {
    5_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_interval_ms: default_initial_interval_ms(),
            max_interval_ms: default_max_interval_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

impl RetryPolicy {
    /// Fixed spacing, no growth
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        let ms = interval.as_millis() as u64;
        Self {
            max_attempts,
            initial_interval_ms: ms,
            max_interval_ms: ms,
            backoff_multiplier: 1.0,
        }
    }

    /// Pause to take after the `attempt`-th (1-based) unsuccessful lookup
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let multiplier = self.backoff_multiplier.max(1.0);
        let ms = (self.initial_interval_ms as f64) * multiplier.powi(exponent);
        let capped = ms.min(self.max_interval_ms.max(self.initial_interval_ms) as f64);
        Duration::from_millis(capped as u64)
    }

    /// Worst-case total time spent waiting between attempts
    pub fn total_budget(&self) -> Duration {
        (1..self.max_attempts.max(1)).map(|a| self.delay_after(a)).sum()
    }
}

/// Reconciler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Delete confirmation polling
    #[serde(default)]
    pub delete_confirmation: RetryPolicy,

    /// Tracked states refreshed concurrently by `refresh_all`
    #[serde(default = "default_refresh_concurrency")]
    pub refresh_concurrency: usize,
}

fn default_refresh_concurrency() -> usize {
    4
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            delete_confirmation: RetryPolicy::default(),
            refresh_concurrency: default_refresh_concurrency(),
        }
    }
}

impl ReconcilerConfig {
    /// Load configuration from environment variables, falling back to defaults
    ///
    /// - `CF_DOMAIN_DELETE_ATTEMPTS`
    /// - `CF_DOMAIN_DELETE_INTERVAL_MS`
    /// - `CF_DOMAIN_DELETE_MAX_INTERVAL_MS`
    /// - `CF_DOMAIN_DELETE_BACKOFF`
    /// - `CF_DOMAIN_REFRESH_CONCURRENCY`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary key source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let policy = &mut config.delete_confirmation;

        if let Some(v) = parse_var::<u32, _>(&lookup, "CF_DOMAIN_DELETE_ATTEMPTS")? {
            policy.max_attempts = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "CF_DOMAIN_DELETE_INTERVAL_MS")? {
            policy.initial_interval_ms = v;
        }
        if let Some(v) = parse_var::<u64, _>(&lookup, "CF_DOMAIN_DELETE_MAX_INTERVAL_MS")? {
            policy.max_interval_ms = v;
        }
        if let Some(v) = parse_var::<f64, _>(&lookup, "CF_DOMAIN_DELETE_BACKOFF")? {
            if !v.is_finite() || v < 1.0 {
                return Err(ConfigError::InvalidValue {
                    key: "CF_DOMAIN_DELETE_BACKOFF".to_string(),
                    value: v.to_string(),
                    reason: "must be a finite number >= 1.0".to_string(),
                });
            }
            policy.backoff_multiplier = v;
        }
        if let Some(v) = parse_var::<usize, _>(&lookup, "CF_DOMAIN_REFRESH_CONCURRENCY")? {
            config.refresh_concurrency = v;
        }

        if config.delete_confirmation.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CF_DOMAIN_DELETE_ATTEMPTS".to_string(),
                value: "0".to_string(),
                reason: "at least one confirmation lookup is required".to_string(),
            });
        }
        config.refresh_concurrency = config.refresh_concurrency.max(1);

        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}
