use std::{future::Future, time::Duration};

use tokio_retry::{
    Retry,
    strategy::{ExponentialBackoff, jitter},
};

/// Longest wait between two attempts at a main chain request.
const MAX_DELAY: Duration = Duration::from_secs(1);

/// Send a JSON-RPC request to the main chain node, such as a receipt or header lookup, again and
/// again until it succeeds.
///
/// The wait between attempts starts at 200ms, grows up to [`MAX_DELAY`] and is jittered. After
/// `max_retries` retries the last error is returned.
pub async fn retry_with_backoff<F, T, E>(
    max_retries: usize,
    request: impl Fn() -> F,
) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let backoff = ExponentialBackoff::from_millis(100)
        .factor(2)
        .max_delay(MAX_DELAY)
        .take(max_retries)
        .map(jitter);

    Retry::spawn(backoff, request).await
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("mock error")]
    struct MockError;

    /// Build a closure which fails until it has been called more than `fail_until` times.
    fn flaky(
        fail_until: usize,
    ) -> (
        Arc<AtomicUsize>,
        impl Fn() -> futures::future::Ready<Result<usize, MockError>>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let f = move || {
            let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
            futures::future::ready(if count <= fail_until {
                Err(MockError)
            } else {
                Ok(count)
            })
        };
        (calls, f)
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let (calls, f) = flaky(0);
        assert_eq!(retry_with_backoff(5, f).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let (calls, f) = flaky(3);
        assert!(retry_with_backoff(5, f).await.is_ok());
        assert_eq!(
            calls.load(Ordering::SeqCst),
            4,
            "should succeed on the 4th attempt"
        );
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let (calls, f) = flaky(5);
        assert!(retry_with_backoff(3, f).await.is_err());
        assert_eq!(
            calls.load(Ordering::SeqCst),
            4,
            "one attempt plus three retries"
        );
    }

    #[tokio::test]
    async fn delays_are_capped() {
        let (_, f) = flaky(3);
        let start = tokio::time::Instant::now();
        assert!(retry_with_backoff(5, f).await.is_ok());

        // Delays are 200ms then capped at 1s, and jitter only ever shortens them:
        assert!(start.elapsed() < Duration::from_millis(200 + 1000 + 1000 + 500));
    }
}
