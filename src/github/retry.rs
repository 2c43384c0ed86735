//! Rate-limited invoker: indefinite fixed-interval retry on rate limiting.
//!
//! The orchestrator wraps every gateway call in [`retry_on_rate_limit`] so
//! pagination and artifact fetches transparently survive GitHub throttling.
//! The loop inspects [`HarvestError::is_retryable`] rather than raw status
//! codes, so tests can inject synthetic retryable failures without a
//! network dependency.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::error::HarvestError;

/// Fixed wait applied after every rate-limit failure. No jitter, no
/// exponential growth; the assumption is that the quota window resets
/// within a minute.
pub const RATE_LIMIT_BACKOFF: Duration = Duration::from_secs(60);

/// Invokes `operation` until it succeeds or fails with a non-retryable
/// error.
///
/// A retryable failure (the rate-limit signal) logs a waiting notice and
/// sleeps for [`RATE_LIMIT_BACKOFF`] before the next attempt. There is no
/// retry cap: a source that keeps answering 403 stalls the invoker
/// indefinitely, which is the accepted behaviour for a transient signal.
///
/// # Errors
///
/// Propagates the first non-retryable [`HarvestError`] returned by
/// `operation`.
pub async fn retry_on_rate_limit<T, F, Fut>(mut operation: F) -> Result<T, HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HarvestError>>,
{
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if error.is_retryable() => {
                warn!(
                    wait_secs = RATE_LIMIT_BACKOFF.as_secs(),
                    %error,
                    "rate limit exceeded, waiting before retrying"
                );
                tokio::time::sleep(RATE_LIMIT_BACKOFF).await;
            }
            Err(error) => return Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use tokio::time::Instant;

    use super::{HarvestError, RATE_LIMIT_BACKOFF, retry_on_rate_limit};

    fn rate_limited() -> HarvestError {
        HarvestError::RateLimitExceeded {
            rate_limit: None,
            message: "API rate limit exceeded".to_owned(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn returns_result_after_n_waits() {
        let attempts = Cell::new(0_u32);
        let started = Instant::now();

        let result = retry_on_rate_limit(|| {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                if attempt <= 3 {
                    Err(rate_limited())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .expect("should succeed after rate limit clears");

        assert_eq!(result, 4, "fourth attempt should succeed");
        assert_eq!(attempts.get(), 4);
        assert_eq!(
            started.elapsed(),
            3 * RATE_LIMIT_BACKOFF,
            "each failure should wait exactly one backoff interval"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn success_on_first_attempt_does_not_sleep() {
        let started = Instant::now();

        let result = retry_on_rate_limit(|| async { Ok::<_, HarvestError>(42) })
            .await
            .expect("should succeed");

        assert_eq!(result, 42);
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_propagates_immediately() {
        let attempts = Cell::new(0_u32);
        let started = Instant::now();

        let error = retry_on_rate_limit(|| {
            attempts.set(attempts.get() + 1);
            async {
                Err::<(), _>(HarvestError::Api {
                    message: "repository not found".to_owned(),
                })
            }
        })
        .await
        .expect_err("should propagate the failure");

        assert!(matches!(error, HarvestError::Api { .. }));
        assert_eq!(attempts.get(), 1, "should not retry");
        assert_eq!(started.elapsed(), std::time::Duration::ZERO);
    }
}
