//! Shared retry policy for the upstream API clients.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::debug;

pub(crate) const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Equal jitter backoff: base/2 + rand(0, base/2).
pub(crate) fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

/// Runs `op` up to [`MAX_RETRIES`] times, sleeping between attempts while
/// `transient` says the error is worth another try.
pub(crate) async fn with_retries<T, E, Fut>(
    api: &str,
    transient: impl Fn(&E) -> bool,
    mut op: impl FnMut() -> Fut,
) -> Result<T, E>
where
    E: Display,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Err(e) if transient(&e) && attempt + 1 < MAX_RETRIES => {
                let delay_ms = jittered_backoff(attempt);
                attempt += 1;
                debug!(api, attempt, delay_ms, error = %e, "retrying after transient error");
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn backoff_stays_within_equal_jitter_bounds() {
        for attempt in 0..MAX_RETRIES {
            let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
            let delay = jittered_backoff(attempt);
            assert!(
                delay >= base / 2 && delay < base,
                "attempt {attempt}: {delay}"
            );
        }
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = with_retries(
            "test",
            |_| true,
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("busy".to_string())
            },
        )
        .await;
        assert_eq!(result.unwrap_err(), "busy");
        assert_eq!(calls.load(Ordering::SeqCst), MAX_RETRIES);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let result: Result<(), String> = with_retries(
            "test",
            |e: &String| e == "busy",
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("denied".to_string())
            },
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = &AtomicU32::new(0);
        let result: Result<u32, String> = with_retries(
            "test",
            |_| true,
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 { Err("busy".to_string()) } else { Ok(n) }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 1);
    }
}
