use crate::error::Error;
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
///
/// Attempts are spaced by a fixed delay; there is no back-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryConfig {
    /// Creates a retry configuration; fewer than one attempt is raised to one.
    #[must_use]
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(
            1,
            Duration::from_secs(crate::constants::DEFAULT_RETRY_DELAY_SECS),
        )
    }
}

/// Emitted between attempts, before sleeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryNotice {
    pub attempt: u32,
    pub max_attempts: u32,
    pub delay: Duration,
    pub error: String,
}

impl fmt::Display for RetryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Attempt {}/{} failed: {}. Retrying in {} seconds...",
            self.attempt,
            self.max_attempts,
            self.error,
            self.delay.as_secs()
        )
    }
}

/// Executes a future with retry logic based on the configuration
///
/// Only retryable errors (see [`Error::is_retryable`]) trigger another
/// attempt. `on_retry` is called once per retry, before the delay.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last error once every
/// attempt has failed.
pub async fn execute_with_retry<F, Fut, T, N>(
    config: &RetryConfig,
    operation_name: &str,
    mut on_retry: N,
    mut operation: F,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
    N: FnMut(&RetryNotice),
{
    let max_attempts = config.max_attempts.max(1);
    let start_time = Instant::now();
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        target: "portico::retry",
                        "{operation_name} succeeded on attempt {attempt}/{max_attempts}"
                    );
                }
                return Ok(result);
            }
            Err(error) => error,
        };

        if !error.is_retryable() {
            return Err(error);
        }
        if attempt >= max_attempts {
            if max_attempts > 1 {
                warn!(
                    target: "portico::retry",
                    "{operation_name} failed after {max_attempts} attempts in {}ms",
                    start_time.elapsed().as_millis()
                );
            }
            return Err(error);
        }

        let notice = RetryNotice {
            attempt,
            max_attempts,
            delay: config.delay,
            error: error.to_string(),
        };
        warn!(target: "portico::retry", "{operation_name}: {notice}");
        on_retry(&notice);

        sleep(config.delay).await;
        attempt += 1;
    }
}
