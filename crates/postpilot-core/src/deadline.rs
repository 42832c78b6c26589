//! Deadline and cancellation for outbound calls.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{PostPilotError, Result};

/// Runs `operation` until it finishes, `timeout` elapses, or `cancel` fires.
///
/// Whichever loses is dropped. Dropping an in-flight HTTP future aborts the
/// underlying request, so an abandoned call does not keep running.
pub async fn run_with_deadline<T, F>(
    operation: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(operation, "operation cancelled by caller");
            Err(PostPilotError::Cancelled { operation: operation.to_string() })
        }
        result = future => result,
        _ = tokio::time::sleep(timeout) => {
            warn!(operation, seconds = timeout.as_secs(), "operation hit its deadline");
            Err(PostPilotError::timeout(operation, timeout.as_secs()))
        }
    }
}

/// Runs `operation` until it finishes or `cancel` fires. For calls whose
/// only bound is the transport timeout.
pub async fn run_until_cancelled<T, F>(
    operation: &str,
    cancel: &CancellationToken,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!(operation, "operation cancelled by caller");
            Err(PostPilotError::Cancelled { operation: operation.to_string() })
        }
        result = future => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fast_future_wins() {
        let token = CancellationToken::new();
        let value = run_with_deadline("Lookup", Duration::from_secs(5), &token, async {
            Ok::<_, PostPilotError>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_future_times_out() {
        let token = CancellationToken::new();
        let err = run_with_deadline("Idea Generation", Duration::from_secs(30), &token, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, PostPilotError>(())
        })
        .await
        .unwrap_err();
        assert_eq!(err, PostPilotError::timeout("Idea Generation", 30));
        assert_eq!(
            err.to_string(),
            "Idea Generation timed out after 30 seconds. Try again."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_wins_over_pending_future() {
        let token = CancellationToken::new();
        token.cancel();
        let err = run_with_deadline("Post Generation", Duration::from_secs(30), &token, async {
            std::future::pending::<Result<()>>().await
        })
        .await
        .unwrap_err();
        assert!(matches!(err, PostPilotError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_until_cancelled_stops_pending_call() {
        let token = CancellationToken::new();
        token.cancel();
        let err = run_until_cancelled("Publishing", &token, async {
            std::future::pending::<Result<()>>().await
        })
        .await
        .unwrap_err();
        assert_eq!(
            err,
            PostPilotError::Cancelled {
                operation: "Publishing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_until_cancelled_passes_result_through() {
        let token = CancellationToken::new();
        let err = run_until_cancelled("Publishing", &token, async {
            Err::<(), _>(PostPilotError::http(500, "boom"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
