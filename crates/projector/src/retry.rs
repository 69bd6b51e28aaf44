//! Bounded retry with exponential backoff.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// An operation failed on every attempt its retry policy allowed.
#[derive(Debug, Error)]
#[error("Operation failed after {attempts} attempts: {last_error}")]
pub struct RetryExhausted<E: std::error::Error + 'static> {
    /// Number of attempts made (equal to the policy's budget).
    pub attempts: u32,
    /// The failure from the final attempt.
    #[source]
    pub last_error: E,
}

/// Bounded retry with a doubling delay between attempts.
///
/// An attempt budget of `n` means the wrapped operation runs at most `n`
/// times, with `base_delay`, then twice that, then four times, slept
/// between consecutive attempts. The policy never retries indefinitely;
/// exhaustion surfaces as [`RetryExhausted`] wrapping the final failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. A zero `max_attempts` is clamped to one: every
    /// operation runs at least once.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Returns the attempt budget.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay slept after a failed attempt (1-based): base
    /// delay for the first, doubling for each attempt after it.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(20);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Runs `op` until it succeeds or the attempt budget is spent.
    pub async fn execute<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if attempt >= self.max_attempts => {
                    return Err(RetryExhausted {
                        attempts: attempt,
                        last_error: error,
                    });
                }
                Err(error) => {
                    let delay = self.delay_for(attempt);
                    tracing::debug!(attempt, ?delay, error = %error, "attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct TestError;

    #[tokio::test]
    async fn success_takes_one_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let attempts = AtomicU32::new(0);

        let result = policy
            .execute(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TestError>(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_on_attempt_k_with_exactly_k_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let attempts = AtomicU32::new(0);

        let result = policy
            .execute(|| {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if attempt < 3 {
                        Err(TestError)
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_reports_attempt_count_and_last_error() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = policy
            .execute(|| {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError) }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(err.last_error.to_string(), "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn sleeps_double_between_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        let result: Result<(), _> = policy.execute(|| async { Err(TestError) }).await;
        assert!(result.is_err());

        // 100ms after the first failure, 200ms after the second.
        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[test]
    fn delays_increase_strictly() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        for attempt in 1..5 {
            assert!(policy.delay_for(attempt + 1) > policy.delay_for(attempt));
        }
    }

    #[test]
    fn zero_attempt_budget_clamps_to_one() {
        let policy = RetryPolicy::new(0, Duration::from_millis(100));
        assert_eq!(policy.max_attempts(), 1);
    }

    #[test]
    fn huge_attempt_numbers_do_not_overflow() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(60));
        let capped = policy.delay_for(u32::MAX);
        assert!(capped >= policy.delay_for(21));
    }
}
