//! Retry with exponential backoff and jitter.
//!
//! Used where Azure is eventually consistent, most notably when a freshly
//! created service principal is not yet visible in the directory.
//!
//! # Example
//!
//! ```ignore
//! use aro_bootstrap::core::retry::{retry_with_backoff, RetryConfig};
//!
//! let object_id = retry_with_backoff(&RetryConfig::default(), "sp show", || {
//!     cloud.service_principal_object_id(&app_id)
//! })?;
//! ```

use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, warn};

/// Backoff schedule for transient failures.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one. Never zero.
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
    /// Multiplier applied after each failed attempt
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a config with a maximum number of attempts
    pub fn with_max_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts.max(1),
            ..Default::default()
        }
    }

    /// Schedule with millisecond delays, for tests and fakes.
    pub fn immediate(attempts: u32) -> Self {
        Self {
            max_attempts: attempts.max(1),
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            backoff_multiplier: 2.0,
        }
    }
}

/// Run `operation` until it succeeds or the attempt budget is spent.
///
/// Sleeps between attempts with exponential backoff; each delay is
/// jittered to 0.5x..1.5x and capped at `max_delay`.
///
/// # Returns
///
/// The first success, or the last error once `max_attempts` is exhausted.
pub fn retry_with_backoff<F, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: std::fmt::Display,
{
    retry_with_backoff_if(config, operation_name, |_| true, operation)
}

/// Like [`retry_with_backoff`], but only errors for which `should_retry`
/// returns `true` are retried. Any other error is returned at once.
pub fn retry_with_backoff_if<F, P, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0u32;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match operation() {
            Ok(result) => return Ok(result),
            Err(e) if !should_retry(&e) => {
                debug!(operation = %operation_name, error = %e, "not retryable");
                return Err(e);
            }
            Err(e) => {
                if attempt >= max_attempts {
                    error!(
                        operation = %operation_name,
                        attempt = attempt,
                        error = %e,
                        "operation failed after max retries"
                    );
                    return Err(e);
                }

                let jitter = rand::thread_rng().gen_range(0.5..1.5);
                let jittered = Duration::from_secs_f64(delay.as_secs_f64() * jitter)
                    .min(config.max_delay);

                warn!(
                    operation = %operation_name,
                    attempt = attempt,
                    error = %e,
                    delay_ms = jittered.as_millis() as u64,
                    "operation failed, retrying"
                );

                std::thread::sleep(jittered);

                delay = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier)
                    .min(config.max_delay);
            }
        }
    }
}
