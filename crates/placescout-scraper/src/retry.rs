//! Retry of a single item's detail extraction.
//!
//! Only transient failures are retried (see [`ItemError::is_transient`]):
//! timeouts and elements that vanished mid-render. Script errors and
//! navigation failures are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::ItemError;

/// Runs `operation`, retrying transient errors with exponential backoff.
///
/// Sleeps `backoff_base * 2^attempt` between attempts, up to `max_retries`
/// extra attempts after the first. With `max_retries = 1` the operation runs
/// at most twice. The last error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    index: usize,
    max_retries: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, ItemError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ItemError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !err.is_transient() || attempt >= max_retries {
            return Err(err);
        }

        let delay = backoff_base.saturating_mul(1u32 << attempt.min(31));
        tracing::warn!(
            index,
            attempt,
            max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient item failure, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
