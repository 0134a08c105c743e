//! Bounded retry with a fixed delay.
//!
//! The pause is a `tokio::time::sleep`, so a waiting pipeline yields its
//! worker to other requests.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{error, info};

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Terminal failure: every attempt failed. Carries the last error.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Runs `op` until it succeeds or `policy.max_attempts` is reached.
pub async fn call_with_retry<T, E, F, Fut>(
    policy: RetryPolicy,
    what: &str,
    mut op: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                error!(attempt, max_attempts = max, error = %e, "{what} failed");
                if attempt >= max {
                    error!("{what}: max retries reached");
                    return Err(RetryExhausted { attempts: attempt, last: e });
                }
                info!("Retrying {what} in {}s", policy.delay.as_secs_f32());
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
