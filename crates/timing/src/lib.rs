//! # Timing helpers
//!
//! Timer utilities used alongside the bounded executor:
//!
//! - [`wait_for`] - complete after a duration
//! - [`delayed`] - produce a value after a duration
//! - [`at_least`] - make an operation settle no earlier than a duration after the call
//! - [`at_most`] - make an operation fail if it does not settle within a duration
//!
//! The executor has no built-in timeouts. Callers that need a time bound wrap
//! individual tasks (or the whole run) with [`at_most`].
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use fanout_timing::{at_most, delayed};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let value = at_most(delayed(7, Duration::from_millis(5)), Duration::from_secs(1))
//!     .await
//!     .unwrap();
//! assert_eq!(value, 7);
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// An operation wrapped with [`at_most`] did not settle in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation did not settle within {limit:?}")]
pub struct DeadlineExceeded {
    /// The limit that was exceeded
    pub limit: Duration,
}

/// Complete after `duration` has elapsed
pub async fn wait_for(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Yield `value` after `duration` has elapsed
pub async fn delayed<T>(value: T, duration: Duration) -> T {
    tokio::time::sleep(duration).await;
    value
}

/// Drive `future` and a `duration` timer together, yielding the future's
/// output once both have finished.
///
/// The timer starts when the returned future is first polled, so the result
/// is available no earlier than `duration` after that point. A future that
/// takes longer than `duration` is not delayed any further.
pub async fn at_least<F>(future: F, duration: Duration) -> F::Output
where
    F: Future,
{
    let ((), output) = tokio::join!(tokio::time::sleep(duration), future);
    output
}

/// Yield the output of `future` if it settles within `limit`.
///
/// The inner future is dropped when the limit is reached.
pub async fn at_most<F>(future: F, limit: Duration) -> Result<F::Output, DeadlineExceeded>
where
    F: Future,
{
    tokio::time::timeout(limit, future).await.map_err(|_| {
        debug!(limit_ms = limit.as_millis() as u64, "Deadline exceeded");
        DeadlineExceeded { limit }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_elapses() {
        let start = Instant::now();
        wait_for(Duration::from_millis(250)).await;
        assert!(start.elapsed() >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_yields_value() {
        let start = Instant::now();
        let value = delayed("done", Duration::from_millis(100)).await;
        assert_eq!(value, "done");
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_least_holds_back_fast_future() {
        let start = Instant::now();
        let value = at_least(async { 42 }, Duration::from_millis(300)).await;
        assert_eq!(value, 42);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_least_does_not_extend_slow_future() {
        let start = Instant::now();
        let value = at_least(
            delayed(1, Duration::from_millis(500)),
            Duration::from_millis(200),
        )
        .await;
        assert_eq!(value, 1);

        // Timer and future run concurrently, not back to back
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(500));
        assert!(elapsed < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_least_passes_errors_through() {
        let result: Result<u32, &str> =
            at_least(async { Err("boom") }, Duration::from_millis(50)).await;
        assert_eq!(result, Err("boom"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_within_limit() {
        let result = at_most(
            delayed(5, Duration::from_millis(50)),
            Duration::from_millis(100),
        )
        .await;
        assert_eq!(result, Ok(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_exceeded() {
        let start = Instant::now();
        let result = at_most(
            delayed(5, Duration::from_secs(10)),
            Duration::from_millis(100),
        )
        .await;

        assert_eq!(
            result,
            Err(DeadlineExceeded {
                limit: Duration::from_millis(100)
            })
        );
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_deadline_exceeded_message() {
        let err = DeadlineExceeded {
            limit: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "operation did not settle within 1.5s");
    }
}
