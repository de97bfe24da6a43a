//! Bounded retry for REST calls.
//!
//! Only [`GatewayError::is_retryable`] errors (rate limits, transport
//! failures) are retried; a 404 or 403 is returned on the first attempt.

use std::time::Duration;

use backon::{BlockingRetryable, ExponentialBuilder};

use crate::error::GatewayError;

pub const INITIAL_BACKOFF_MS: u64 = 1_000;
pub const MAX_BACKOFF_MS: u64 = 30_000;
pub const MAX_RETRIES: usize = 3;

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retry attempts after the first call.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: MAX_RETRIES,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// A single attempt, no retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 0)
    }

    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Run `operation`, retrying retryable gateway errors with exponential
/// backoff. `label` names the request in debug logs.
pub fn with_retry<T, F>(config: &RetryConfig, label: &str, operation: F) -> Result<T, GatewayError>
where
    F: FnMut() -> Result<T, GatewayError>,
{
    operation
        .retry(config.clone().into_backoff())
        .sleep(std::thread::sleep)
        .when(GatewayError::is_retryable)
        .notify(|err: &GatewayError, delay: Duration| {
            tracing::debug!(request = label, ?delay, error = %err, "retrying request");
        })
        .call()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast(retries: usize) -> RetryConfig {
        RetryConfig::new(Duration::ZERO, Duration::from_millis(1), retries).with_jitter(false)
    }

    fn network() -> GatewayError {
        GatewayError::Network {
            resource: "repos/acme/foo".into(),
            message: "connection reset".into(),
        }
    }

    #[test]
    fn default_config_is_bounded() {
        let config = RetryConfig::default();
        assert_eq!(config.min_delay, Duration::from_millis(INITIAL_BACKOFF_MS));
        assert_eq!(config.max_delay, Duration::from_millis(MAX_BACKOFF_MS));
        assert_eq!(config.max_retries, MAX_RETRIES);
        assert!(config.with_jitter);
    }

    #[test]
    fn transient_failures_are_retried_until_success() {
        let attempts = Cell::new(0);
        let result = with_retry(&fast(3), "get repo", || {
            attempts.set(attempts.get() + 1);
            if attempts.get() < 3 {
                Err(network())
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn not_found_is_never_retried() {
        let attempts = Cell::new(0);
        let result: Result<(), _> = with_retry(&fast(3), "get repo", || {
            attempts.set(attempts.get() + 1);
            Err(GatewayError::NotFound {
                resource: "repos/acme/foo".into(),
            })
        });
        assert!(result.unwrap_err().is_not_found());
        assert_eq!(attempts.get(), 1);
    }

    #[test]
    fn retries_stop_at_the_configured_bound() {
        let attempts = Cell::new(0);
        let result: Result<(), _> = with_retry(&fast(2), "get repo", || {
            attempts.set(attempts.get() + 1);
            Err(network())
        });
        assert!(result.is_err());
        assert_eq!(attempts.get(), 3);
    }

    #[test]
    fn disabled_config_makes_one_attempt() {
        let attempts = Cell::new(0);
        let _: Result<(), _> = with_retry(&RetryConfig::disabled(), "get repo", || {
            attempts.set(attempts.get() + 1);
            Err(network())
        });
        assert_eq!(attempts.get(), 1);
    }
}
