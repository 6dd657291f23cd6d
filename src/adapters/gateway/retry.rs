//! Bounded retry with backoff for gateway calls.
//!
//! One policy type serves both gateway operations; they differ only in the
//! backoff curve and in which failures are worth another attempt.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * 2^attempt`: 1s, 2s, 4s, ... for a 1s base.
    Exponential { base: Duration },
    /// `step * (attempt + 1)`: 1s, 2s, 3s, ... for a 1s step.
    Linear { step: Duration },
}

impl Backoff {
    pub fn exponential() -> Self {
        Backoff::Exponential {
            base: Duration::from_secs(1),
        }
    }

    pub fn linear() -> Self {
        Backoff::Linear {
            step: Duration::from_secs(1),
        }
    }

    /// Delay after the failed attempt numbered `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Backoff::Exponential { base } => base.saturating_mul(2u32.saturating_pow(attempt)),
            Backoff::Linear { step } => step.saturating_mul(attempt.saturating_add(1)),
        }
    }
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryFailure<E> {
    /// The failure was classified as not retryable.
    Permanent { error: E, attempts: u32 },
    /// Every allowed attempt failed.
    Exhausted { last: E, attempts: u32 },
}

impl<E> RetryFailure<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryFailure::Permanent { attempts, .. } | RetryFailure::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn into_error(self) -> E {
        match self {
            RetryFailure::Permanent { error, .. } => error,
            RetryFailure::Exhausted { last, .. } => last,
        }
    }
}

/// Max retries, a backoff curve and a retryable predicate.
///
/// `max_retries` counts attempts after the first, so a policy runs at most
/// `max_retries + 1` attempts.
pub struct RetryPolicy<E> {
    max_retries: u32,
    backoff: Backoff,
    retryable: fn(&E) -> bool,
}

impl<E> Clone for RetryPolicy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for RetryPolicy<E> {}

impl<E> std::fmt::Debug for RetryPolicy<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl<E> RetryPolicy<E> {
    pub fn new(max_retries: u32, backoff: Backoff, retryable: fn(&E) -> bool) -> Self {
        Self {
            max_retries,
            backoff,
            retryable,
        }
    }

    /// Same policy with a different retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Runs `operation` until it succeeds, fails permanently, or the budget runs out.
    ///
    /// The operation receives the 0-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, RetryFailure<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;

        loop {
            let error = match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !(self.retryable)(&error) {
                return Err(RetryFailure::Permanent {
                    error,
                    attempts: attempt + 1,
                });
            }

            if attempt >= self.max_retries {
                return Err(RetryFailure::Exhausted {
                    last: error,
                    attempts: attempt + 1,
                });
            }

            let delay = self.backoff.delay(attempt);
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Backing off before retry");
            sleep(delay).await;
            attempt += 1;
        }
    }
}
