//! Retry logic with exponential backoff
//!
//! Downloads are attempted once by default. When [`RetryConfig::max_attempts`]
//! is raised, transient failures (timeouts, dropped connections, 5xx responses)
//! are retried with exponential backoff and optional jitter. Everything else
//! fails the job on the first attempt.

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (network timeouts, server busy, connection reset) should return `true`.
/// Permanent failures (missing resource, bad request, tool failure) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // No response at all (connect/body failures) or a server-side status
            Error::Network { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500 || *code == 429 || *code == 408,
            },
            Error::Timeout { .. } => true,
            Error::Filesystem(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            // A missing resource will not appear on retry
            Error::NotFound { .. } => false,
            Error::InvalidRequest(_)
            | Error::Config { .. }
            | Error::Process { .. }
            | Error::ToolUnavailable(_)
            | Error::FileCollision { .. }
            | Error::Serialization(_)
            | Error::Cancelled
            | Error::Unexpected(_) => false,
        }
    }
}

/// Run `operation`, retrying transient failures as `config` allows
///
/// Makes at most `1 + config.max_attempts` attempts and returns the first
/// success or the last error.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut delay = config.initial_delay;
    let mut retries = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_retryable() || retries == config.max_attempts {
            return Err(err);
        }

        retries += 1;
        let wait = if config.jitter { jittered(delay) } else { delay };
        tracing::warn!(
            error = %err,
            retry = retries,
            of = config.max_attempts,
            wait_ms = wait.as_millis() as u64,
            "transient failure, retrying"
        );
        tokio::time::sleep(wait).await;
        delay = next_delay(delay, config);
    }
}

fn next_delay(delay: Duration, config: &RetryConfig) -> Duration {
    delay.mul_f64(config.backoff_multiplier).min(config.max_delay)
}

/// Stretch `delay` by a random factor in `[1, 2]`
fn jittered(delay: Duration) -> Duration {
    delay.mul_f64(rand::thread_rng().gen_range(1.0..=2.0))
}
