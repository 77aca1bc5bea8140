//! Deadlines for record-store calls
//!
//! A store call that does not answer within its deadline is reported as
//! [`DomainError::StoreUnavailable`]. Whether the write landed is unknown,
//! so callers re-query before resubmitting.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::shared::types::{DomainError, DomainResult};

/// Await `call`, failing with `StoreUnavailable` once `limit` elapses.
pub async fn with_deadline<T, F>(limit: Duration, operation: &'static str, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, timeout_ms = limit.as_millis() as u64, "Record store call timed out");
            Err(DomainError::StoreUnavailable(format!(
                "{} timed out after {} ms",
                operation,
                limit.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_results_within_deadline() {
        let value = with_deadline(Duration::from_millis(100), "fast", async { Ok(7) }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn slow_call_becomes_store_unavailable() {
        let result: DomainResult<()> = with_deadline(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(DomainError::StoreUnavailable(_))));
    }
}
