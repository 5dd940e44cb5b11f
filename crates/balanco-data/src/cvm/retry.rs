//! Retry policy for archive downloads.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay strategy between attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// `base * factor^attempt`, capped at `max`.
    Exponential {
        /// Delay before the first retry
        base: Duration,
        /// Multiplier applied per attempt
        factor: f64,
        /// Upper bound on any single delay
        max: Duration,
    },
}

/// Configuration for the automatic retry mechanism.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Enables or disables retries.
    pub enabled: bool,
    /// Maximum number of retries; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay strategy.
    pub backoff: Backoff,
    /// HTTP status codes that trigger a retry.
    pub retry_on_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 3,
            backoff: Backoff::Exponential {
                base: Duration::from_millis(500),
                factor: 2.0,
                max: Duration::from_secs(8),
            },
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
        }
    }
}

impl RetryConfig {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Whether another attempt is allowed after `attempt` failed retries.
    pub const fn allows(&self, attempt: u32) -> bool {
        self.enabled && attempt < self.max_retries
    }

    /// Whether an HTTP status should be retried.
    pub fn retries_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed(delay) => *delay,
            Backoff::Exponential { base, factor, max } => {
                let scaled = base.mul_f64(factor.powi(attempt as i32));
                scaled.min(*max)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_delay_is_capped() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay(0), Duration::from_millis(500));
        assert_eq!(retry.delay(1), Duration::from_secs(1));
        assert_eq!(retry.delay(2), Duration::from_secs(2));
        assert_eq!(retry.delay(10), Duration::from_secs(8));
    }

    #[test]
    fn test_fixed_delay() {
        let retry = RetryConfig {
            backoff: Backoff::Fixed(Duration::from_millis(50)),
            ..RetryConfig::default()
        };
        assert_eq!(retry.delay(0), retry.delay(3));
    }

    #[test]
    fn test_allows() {
        let retry = RetryConfig::default();
        assert!(retry.allows(0));
        assert!(retry.allows(2));
        assert!(!retry.allows(3));
        assert!(!RetryConfig::disabled().allows(0));
    }

    #[test]
    fn test_retries_status() {
        let retry = RetryConfig::default();
        assert!(retry.retries_status(503));
        assert!(!retry.retries_status(404));
    }
}
