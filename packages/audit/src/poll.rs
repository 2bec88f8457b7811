//! Long-poll supervisor for asynchronous external jobs.
//!
//! The only sanctioned retry loop in the pipeline: a stage that depends
//! on an unbounded-latency external job (video indexing) waits for it
//! through [`await_completion`] instead of hand-rolling a loop. The
//! supervisor knows nothing about video semantics — just a poll
//! function, a completion predicate, and a bound.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::PollError;

/// Poll `poll_fn` at a fixed `interval` until `is_done` accepts a result
/// or `timeout` elapses.
///
/// The job handle is captured by `poll_fn`. The first poll happens
/// immediately (already-finished jobs return without sleeping); after
/// that, one `interval` sleep separates attempts. Fails with
/// [`PollError::Timeout`] when the next attempt would land past the
/// deadline, and with [`PollError::Upstream`] if `poll_fn` itself errors.
pub async fn await_completion<T, E, F, Fut>(
    mut poll_fn: F,
    is_done: impl Fn(&T) -> bool,
    timeout: Duration,
    interval: Duration,
) -> Result<T, PollError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let deadline = started + timeout;

    loop {
        let result = poll_fn()
            .await
            .map_err(|e| PollError::Upstream(Box::new(e)))?;

        if is_done(&result) {
            return Ok(result);
        }

        let next_attempt = Instant::now() + interval;
        if next_attempt > deadline {
            return Err(PollError::Timeout(started.elapsed()));
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("backend down")]
    struct BackendDown;

    #[tokio::test]
    async fn returns_immediately_when_first_poll_is_done() {
        let result = await_completion(
            || async { Ok::<_, Infallible>("Processed") },
            |s| *s == "Processed",
            Duration::from_secs(60),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(result, "Processed");
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_several_attempts() {
        let attempts = AtomicUsize::new(0);

        let result = await_completion(
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    Ok::<_, Infallible>(if n >= 3 { "Processed" } else { "Processing" })
                }
            },
            |s| *s == "Processed",
            Duration::from_secs(60),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

        assert_eq!(result, "Processed");
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_at_the_bound_not_before_and_not_after() {
        let start = Instant::now();

        let err = await_completion(
            || async { Ok::<_, Infallible>("Processing") },
            |s| *s == "Processed",
            Duration::from_secs(60),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        let elapsed = start.elapsed();
        assert!(matches!(err, PollError::Timeout(_)));
        // 12 sleeps of 5s fit inside 60s; the 13th attempt would not.
        assert!(elapsed >= Duration::from_secs(55), "gave up early: {elapsed:?}");
        assert!(elapsed <= Duration::from_secs(61), "ran past bound: {elapsed:?}");
    }

    #[tokio::test]
    async fn upstream_error_is_not_retried() {
        let attempts = AtomicUsize::new(0);

        let err = await_completion(
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err::<&str, _>(BackendDown) }
            },
            |_| true,
            Duration::from_secs(60),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PollError::Upstream(_)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
