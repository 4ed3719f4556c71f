//! Bounded retry execution for provider lookups
//!
//! One lookup is retried only on transient failures, with a fixed pause
//! between attempts and no backoff. Terminal failures return immediately,
//! and an exhausted budget is a handled per-record outcome rather than an
//! error that stops the batch.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Classifies an operation error as retryable or terminal
pub trait ErrorClass {
    fn is_transient(&self) -> bool;
}

/// Retry policy injected into [`run`]: attempt budget plus the fixed pause
/// between attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Fixed pause before each retry
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            // A zero budget would mean no call at all; clamp to one attempt.
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Outcome of a retried operation
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded within the budget
    Success(T),
    /// The operation failed in a way that retrying cannot fix
    Terminal(E),
    /// Every attempt failed transiently
    Exhausted { attempts: u32, last: E },
}

impl<T, E> RetryOutcome<T, E> {
    /// The success value, if any
    pub fn into_success(self) -> Option<T> {
        match self {
            RetryOutcome::Success(value) => Some(value),
            _ => None,
        }
    }
}

/// Run `operation` under `policy`.
///
/// The pause between attempts blocks the calling sequence; nothing else runs
/// for this record while a retry is pending.
pub async fn run<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> RetryOutcome<T, E>
where
    E: ErrorClass + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => {
                debug!(attempt, "lookup succeeded");
                return RetryOutcome::Success(value);
            }
            Err(err) if err.is_transient() => {
                if attempt >= max_attempts {
                    warn!(attempt, error = %err, "retry budget exhausted");
                    return RetryOutcome::Exhausted {
                        attempts: attempt,
                        last: err,
                    };
                }
                warn!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "transient failure, retrying after {:?}",
                    policy.delay
                );
                sleep(policy.delay).await;
            }
            Err(err) => {
                debug!(attempt, error = %err, "terminal failure, not retrying");
                return RetryOutcome::Terminal(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fmt;

    #[derive(Debug)]
    enum StubError {
        Transient,
        Terminal,
    }

    impl fmt::Display for StubError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                StubError::Transient => write!(f, "transient"),
                StubError::Terminal => write!(f, "terminal"),
            }
        }
    }

    impl ErrorClass for StubError {
        fn is_transient(&self) -> bool {
            matches!(self, StubError::Transient)
        }
    }

    fn quick_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Cell::new(0u32);
        let outcome = run(&quick_policy(3), || {
            calls.set(calls.get() + 1);
            async { Ok::<_, StubError>(42) }
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Success(42)));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_always_transient_exhausts_budget() {
        let calls = Cell::new(0u32);
        let outcome = run(&quick_policy(3), || {
            calls.set(calls.get() + 1);
            async { Err::<u32, _>(StubError::Transient) }
        })
        .await;

        assert_eq!(calls.get(), 3);
        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_terminal_failure_short_circuits() {
        let calls = Cell::new(0u32);
        let outcome = run(&quick_policy(3), || {
            calls.set(calls.get() + 1);
            async { Err::<u32, _>(StubError::Terminal) }
        })
        .await;

        assert_eq!(calls.get(), 1);
        assert!(matches!(outcome, RetryOutcome::Terminal(StubError::Terminal)));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = Cell::new(0u32);
        let outcome = run(&quick_policy(3), || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(StubError::Transient)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert!(matches!(outcome, RetryOutcome::Success(3)));
    }

    #[test]
    fn test_zero_budget_clamps_to_one() {
        assert_eq!(quick_policy(0).max_attempts, 1);
    }

    #[test]
    fn test_into_success() {
        let success: RetryOutcome<u32, StubError> = RetryOutcome::Success(7);
        assert_eq!(success.into_success(), Some(7));

        let terminal: RetryOutcome<u32, StubError> = RetryOutcome::Terminal(StubError::Terminal);
        assert_eq!(terminal.into_success(), None);
    }
}
