// src/core/retry.rs
//! Bounded retry for flaky UI steps.
//!
//! A step is retried only when its error passes the caller's predicate, and only
//! up to `max_attempts` total tries. Between tries the policy's backoff decides
//! the pause.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backoff {
    Fixed(Duration),
    /// `base * 2^(attempt-1)`, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Pause after the given failed attempt (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(d) => d,
            Backoff::Exponential { base, max } => {
                let exp = attempt.saturating_sub(1).min(16);
                base.saturating_mul(1u32 << exp).min(max)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self { max_attempts, backoff: Backoff::Fixed(delay) }
    }

    pub fn exponential(max_attempts: u32, base: Duration, max: Duration) -> Self {
        Self { max_attempts, backoff: Backoff::Exponential { base, max } }
    }

    /// Single try, no retry.
    pub fn once() -> Self {
        Self::fixed(1, Duration::ZERO)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the policy
/// runs out of attempts. `op` receives the 1-based attempt number.
pub fn execute_with_retry<T, E, P, F>(
    policy: &RetryPolicy,
    label: &str,
    is_retryable: P,
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    P: Fn(&E) -> bool,
    F: FnMut(u32) -> Result<T, E>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempt >= max || !is_retryable(&e) {
                    if attempt > 1 {
                        loge!(step = label, attempt, "giving up: {e}");
                    }
                    return Err(e);
                }
                let delay = policy.backoff.delay(attempt);
                logw!(step = label, attempt, "attempt failed ({e}); next try in {delay:?}");
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}
