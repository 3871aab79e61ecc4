//! Exponential backoff with jitter for retrying transient failures

use crate::error::{RemoteError, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Exponential backoff calculator with jitter
pub struct Backoff {
    base_ms: u64,
    max_ms: u64,
    attempt: u32,
}

impl Backoff {
    /// Create a new backoff starting at `base_ms` with a cap of `max_ms`.
    pub fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            attempt: 0,
        }
    }

    /// Get the next delay duration and increment the attempt counter.
    pub fn next_delay(&mut self) -> Duration {
        let exp = self.base_ms.saturating_mul(1u64.wrapping_shl(self.attempt));
        let capped = exp.min(self.max_ms);
        let jitter = rand::random::<u64>() % (capped / 4 + 1);
        self.attempt = self.attempt.saturating_add(1);
        Duration::from_millis(capped + jitter)
    }

    /// Reset the backoff after a success.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// How many times, and how patiently, to retry a transient failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 disables retrying)
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.base_delay_ms, self.max_delay_ms)
    }
}

/// Run `op` until it succeeds, fails permanently, or the retries run out
///
/// Only errors for which [`RemoteError::is_transient`] holds are retried.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RemoteError>>,
{
    let mut backoff = policy.backoff();
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = backoff.next_delay();
                tracing::warn!(
                    request = what,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient remote failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
