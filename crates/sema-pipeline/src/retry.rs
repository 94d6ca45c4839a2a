//! Bounded retry with exponential backoff for transient backend failures.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run `op` up to `attempts` times, sleeping `backoff * 2^n` between
/// tries. Only errors the predicate marks as transient are retried;
/// client errors propagate immediately.
pub(crate) async fn with_retry<T, E, F, Fut>(
    attempts: u32,
    backoff: Duration,
    is_transient: impl Fn(&E) -> bool,
    what: &str,
    op: F,
) -> Result<T, E>
where
    E: std::fmt::Display,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if !is_transient(&e) || attempt + 1 == attempts {
                    return Err(e);
                }
                let delay = backoff * 2u32.saturating_pow(attempt);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    what,
                    attempt + 1,
                    attempts,
                    delay,
                    e
                );
                last_err = Some(e);
                tokio::time::sleep(delay).await;
            }
        }
    }

    // Unreachable: the loop always returns on the last attempt
    Err(last_err.expect("retry loop ran at least once"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct TestError {
        transient: bool,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "test error (transient: {})", self.transient)
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retry(
            3,
            Duration::from_millis(1),
            |e: &TestError| e.transient,
            "op",
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(TestError { transient: true })
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_fail_fast() {
        let calls = AtomicU32::new(0);

        let result = with_retry(
            3,
            Duration::from_millis(1),
            |e: &TestError| e.transient,
            "op",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>(TestError { transient: false }) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_budget_is_bounded() {
        let calls = AtomicU32::new(0);

        let result = with_retry(
            3,
            Duration::from_millis(1),
            |e: &TestError| e.transient,
            "op",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<u32, _>(TestError { transient: true }) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
