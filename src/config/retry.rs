//! Retry settings

use std::time::Duration;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::retry::{Classify, RetryPolicy};

/// `[retry]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Backoff ceiling
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    /// Add up to 10% random jitter to every delay
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
            jitter: default_jitter(),
        }
    }
}

impl RetrySettings {
    /// Build a policy with the default retry predicate
    pub fn to_policy<E: Classify + 'static>(&self) -> Result<RetryPolicy<E>> {
        ensure!(
            self.max_delay_ms >= self.base_delay_ms,
            "retry.max_delay_ms ({}) must be >= retry.base_delay_ms ({})",
            self.max_delay_ms,
            self.base_delay_ms
        );
        ensure!(
            self.backoff_factor.is_finite() && self.backoff_factor >= 1.0,
            "retry.backoff_factor must be >= 1.0, got {}",
            self.backoff_factor
        );

        let policy = RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.base_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
        .with_backoff_factor(self.backoff_factor);

        Ok(if self.jitter {
            policy
        } else {
            policy.without_jitter()
        })
    }
}
