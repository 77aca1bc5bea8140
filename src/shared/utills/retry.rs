//! Retry with exponential backoff
//!
//! Caller-side helper. The ledgers themselves never retry: a rejected append
//! is returned as-is and the caller decides. The HTTP adapter uses this to
//! resubmit appends that lost an optimistic sequence check.

use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one).
    pub max_attempts: u32,
    /// Initial delay between retries.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Maximum delay between retries (cap).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(2),
        }
    }
}

/// Execute an async operation with exponential backoff retry.
///
/// The `should_retry` closure determines whether a given error is transient
/// (and therefore retryable) or permanent (bail immediately).
///
/// # Example
/// ```ignore
/// let reading = retry_with_backoff(
///     RetryConfig::default(),
///     || odometer.add_reading(vehicle_id, value, source, at, None),
///     |err| matches!(err, DomainError::Conflict { .. }),
///     "add_reading",
/// ).await?;
/// ```
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: RetryConfig,
    mut operation: F,
    should_retry: impl Fn(&E) -> bool,
    operation_name: &str,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(operation = operation_name, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if attempt >= config.max_attempts || !should_retry(&err) {
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = config.max_attempts,
                        error = %err,
                        "Operation failed permanently"
                    );
                    return Err(err);
                }

                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts = config.max_attempts,
                    error = %err,
                    retry_in_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );

                tokio::time::sleep(delay).await;

                // Exponential backoff with cap
                delay = Duration::from_secs_f64(
                    (delay.as_secs_f64() * config.backoff_multiplier)
                        .min(config.max_delay.as_secs_f64()),
                );
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::shared::types::DomainError;

    fn fast() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(5),
        }
    }

    fn conflict() -> DomainError {
        DomainError::Conflict {
            entity: "RechargeMovement",
            key: "card".into(),
        }
    }

    #[tokio::test]
    async fn retries_conflicts_until_success() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = retry_with_backoff(
            fast(),
            || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(conflict())
                } else {
                    Ok("stored")
                }
            },
            |e| matches!(e, DomainError::Conflict { .. }),
            "test",
        )
        .await;
        assert_eq!(result, Ok("stored"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), DomainError> = retry_with_backoff(
            fast(),
            || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DomainError::validation("amount", "must be positive"))
            },
            |e| matches!(e, DomainError::Conflict { .. }),
            "test",
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: Result<(), DomainError> = retry_with_backoff(
            fast(),
            || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(conflict())
            },
            |e| matches!(e, DomainError::Conflict { .. }),
            "test",
        )
        .await;
        assert_eq!(result, Err(conflict()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
