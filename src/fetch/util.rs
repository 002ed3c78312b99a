//! Shared HTTP plumbing for the page fetchers.

use anyhow::Result;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Pause between retry attempts.
pub const RETRY_DELAY: Duration = Duration::from_millis(500);
/// Total tries per request, first attempt included.
pub const RETRY_ATTEMPTS: u32 = 3;

pub fn client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(super::USER_AGENT)
        .build()?)
}

/// Runs `operation` up to `attempts` times, sleeping `delay` between
/// tries. Returns the first success or the last error.
pub async fn with_retry<F, Fut, T, E>(
    mut operation: F,
    attempts: u32,
    delay: Duration,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                debug!(attempt, attempts, error = %err, "request failed, retrying");
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = with_retry(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err("boom") } else { Ok(n) }
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_last_attempt() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom")
            },
            3,
            Duration::from_millis(1),
        )
        .await;

        assert_eq!(result, Err("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
