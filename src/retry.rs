//! Bounded exponential-backoff retry around a single logical network call.

use std::time::Duration;

use log::info;

use crate::shared::error::LynkError;

/// A failed attempt, classified once at the call site.
#[derive(Debug)]
pub enum Failure {
    /// Surface immediately, never retry (auth, 4xx, GraphQL errors)
    Fatal(LynkError),
    /// Eligible for another attempt (429, 5xx, connection failures)
    Retryable(LynkError),
}

/// Classify an HTTP error status into a fatal or retryable failure.
///
/// 401 is authentication, 429 is rate limiting, other 4xx are client
/// errors carrying any message extracted from the body, 5xx are server
/// errors.
pub fn classify_status(status: u16, message: Option<String>) -> Failure {
    match status {
        401 => Failure::Fatal(LynkError::Authentication),
        429 => Failure::Retryable(LynkError::RateLimited),
        s if s >= 500 => Failure::Retryable(LynkError::Server { status: s }),
        s => Failure::Fatal(LynkError::Client { status: s, message }),
    }
}

/// Retry schedule: the first try is free, each retryable failure waits
/// `base_delay * 2^attempt` before the next attempt, up to `max_retries`
/// additional attempts. The schedule bounds the attempt count, not the
/// total wall-clock time.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Override the backoff base delay. Used by tests to keep the
    /// schedule deterministic without waiting full seconds.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `operation` until it succeeds, fails fatally, or the retry
    /// budget is spent. Exhaustion surfaces the last failure annotated
    /// with the total attempt count.
    pub fn execute<T, F>(&self, mut operation: F) -> Result<T, LynkError>
    where
        F: FnMut() -> Result<T, Failure>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(error)) => return Err(error),
                Err(Failure::Retryable(error)) => {
                    if attempt >= self.max_retries {
                        return Err(LynkError::RetriesExhausted {
                            attempts: attempt + 1,
                            last: Box::new(error),
                        });
                    }
                    let delay = self.base_delay * 2u32.pow(attempt);
                    info!(
                        "Retrying in {:.1}s ({}/{} retries used): {}",
                        delay.as_secs_f64(),
                        attempt + 1,
                        self.max_retries,
                        error
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Instant;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries).with_base_delay(Duration::from_millis(1))
    }

    #[test]
    fn test_success_on_first_attempt() {
        let calls = Cell::new(0u32);
        let result = fast_policy(3).execute(|| {
            calls.set(calls.get() + 1);
            Ok::<_, Failure>(42)
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_retryable_failure_exhausts_after_four_attempts() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = fast_policy(3).execute(|| {
            calls.set(calls.get() + 1);
            Err(Failure::Retryable(LynkError::Server { status: 503 }))
        });
        assert_eq!(calls.get(), 4);
        match result.unwrap_err() {
            LynkError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 4);
                assert!(matches!(*last, LynkError::Server { status: 503 }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_backoff_schedule_doubles() {
        // base 10ms: waits of 10, 20, 40 between the four attempts
        let policy = RetryPolicy::new(3).with_base_delay(Duration::from_millis(10));
        let start = Instant::now();
        let result: Result<(), _> = policy.execute(|| {
            Err(Failure::Retryable(LynkError::Transport {
                details: "connection reset".to_string(),
            }))
        });
        let elapsed = start.elapsed();
        assert!(result.is_err());
        assert!(elapsed >= Duration::from_millis(70), "elapsed {:?}", elapsed);
    }

    #[test]
    fn test_fatal_failure_short_circuits() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = fast_policy(5).execute(|| {
            calls.set(calls.get() + 1);
            Err(Failure::Fatal(LynkError::Authentication))
        });
        assert_eq!(calls.get(), 1);
        assert!(matches!(result.unwrap_err(), LynkError::Authentication));
    }

    #[test]
    fn test_zero_retries_means_single_attempt() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = fast_policy(0).execute(|| {
            calls.set(calls.get() + 1);
            Err(Failure::Retryable(LynkError::RateLimited))
        });
        assert_eq!(calls.get(), 1);
        match result.unwrap_err() {
            LynkError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 1);
                assert!(matches!(*last, LynkError::RateLimited));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_success_after_transient_failures() {
        let calls = Cell::new(0u32);
        let result = fast_policy(3).execute(|| {
            calls.set(calls.get() + 1);
            if calls.get() < 3 {
                Err(Failure::Retryable(LynkError::Server { status: 502 }))
            } else {
                Ok("done")
            }
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_classify_401_is_fatal_authentication() {
        match classify_status(401, None) {
            Failure::Fatal(LynkError::Authentication) => {}
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_classify_429_is_retryable() {
        assert!(matches!(
            classify_status(429, None),
            Failure::Retryable(LynkError::RateLimited)
        ));
    }

    #[test]
    fn test_classify_4xx_is_fatal_client_error() {
        match classify_status(422, Some("bad input".to_string())) {
            Failure::Fatal(LynkError::Client { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message.as_deref(), Some("bad input"));
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_classify_5xx_is_retryable() {
        assert!(matches!(
            classify_status(503, None),
            Failure::Retryable(LynkError::Server { status: 503 })
        ));
    }
}
