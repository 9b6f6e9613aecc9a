//! Deadline wrapper for calls into external services.

use std::future::Future;
use std::time::Duration;

use bridge_host::BridgeError;
use tokio::time::timeout;
use tracing::warn;

/// Awaits `call`, failing with [`BridgeError::Timeout`] once `limit` elapses.
///
/// The abandoned call is dropped; nothing is unwound on the external side.
pub(crate) async fn bounded<F, T>(
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Result<T, BridgeError>
where
    F: Future<Output = T>,
{
    match timeout(limit, call).await {
        Ok(value) => Ok(value),
        Err(_) => {
            let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(operation, timeout_ms, "external call timed out");
            Err(BridgeError::Timeout {
                operation,
                timeout_ms,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::bounded;
    use bridge_host::BridgeError;

    #[tokio::test]
    async fn completes_before_deadline() {
        let value = bounded("test.ready", Duration::from_secs(5), async { 7 }).await;
        assert_eq!(value, Ok(7));
    }

    #[tokio::test]
    async fn pending_call_times_out() {
        let result = bounded(
            "test.hang",
            Duration::from_millis(10),
            futures::future::pending::<()>(),
        )
        .await;
        assert_eq!(
            result,
            Err(BridgeError::Timeout {
                operation: "test.hang",
                timeout_ms: 10
            })
        );
    }
}
