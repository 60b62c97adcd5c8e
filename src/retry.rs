//! Retry logic with exponential backoff.
//!
//! Used for waits that race against asynchronous DOM updates, where a
//! panel's result tables may take a few attempts to appear.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Config for waiting on a category panel's result tables.
    pub fn table_wait(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_delay: backoff,
            max_delay: backoff * 8,
            multiplier: 2.0,
        }
    }

    /// Calculate delay for a given attempt
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

/// Retry an async operation with exponential backoff.
///
/// The operation re-borrows `state` on every attempt, so a caller can
/// retry methods on an exclusively owned session without cloning it.
pub async fn retry<St, T, E, F>(
    config: &RetryConfig,
    operation_name: &str,
    state: &mut St,
    mut operation: F,
) -> Result<T, E>
where
    F: for<'a> FnMut(&'a mut St) -> Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>,
    E: std::fmt::Display,
{
    let mut last_error: Option<E> = None;

    for attempt in 0..=config.max_retries {
        match operation(state).await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("{} succeeded after {} retries", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt < config.max_retries {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {:?}...",
                        operation_name,
                        attempt + 1,
                        config.max_retries + 1,
                        e,
                        delay
                    );
                    sleep(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap())
}
