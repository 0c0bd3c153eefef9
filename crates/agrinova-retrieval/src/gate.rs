//! Bounded admission for query-time embedding calls.
//!
//! At most `max_concurrency` embedding calls run at once. Further callers wait
//! in FIFO order on the semaphore and are never rejected. An optional timeout
//! fails only the call that exceeded it.
//!
//! Admitted calls run on their own task that owns the permit, so a call whose
//! caller timed out keeps its slot until the underlying work finishes.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use agrinova_embeddings::EmbeddingError;
use tokio::sync::Semaphore;
use tokio::task::JoinError;

/// Embedding calls currently waiting for a permit (gauge).
pub const EMBEDDING_QUEUE_WAITING: &str = "embedding_queue_waiting";
/// Embedding call duration once admitted (histogram, seconds).
pub const EMBEDDING_DURATION_SECONDS: &str = "embedding_duration_seconds";

/// Concurrency limiter for the embedding function.
#[derive(Debug)]
pub struct EmbeddingGate {
    permits: Arc<Semaphore>,
    max_concurrency: usize,
    timeout: Option<Duration>,
    waiting: AtomicUsize,
}

impl EmbeddingGate {
    /// Create a gate admitting `max_concurrency` calls (at least one).
    pub fn new(max_concurrency: usize, timeout: Option<Duration>) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
            timeout,
            waiting: AtomicUsize::new(0),
        }
    }

    /// Run `call` once a permit is free, applying the timeout if configured.
    ///
    /// On timeout the caller gets [`EmbeddingError::Timeout`] while `call`
    /// runs to completion in the background, still holding its permit.
    pub async fn run<T, F>(&self, call: F) -> Result<T, EmbeddingError>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, EmbeddingError>> + Send + 'static,
    {
        let permit = {
            let _waiting = WaitingGuard::enter(&self.waiting);
            Arc::clone(&self.permits).acquire_owned().await
        };
        let permit =
            permit.map_err(|_| EmbeddingError::Internal("embedding gate closed".into()))?;

        let started = Instant::now();
        let task = tokio::spawn(async move {
            let _permit = permit;
            call.await
        });
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined.unwrap_or_else(|e| Err(join_failure(&e))),
                Err(_) => {
                    #[allow(clippy::cast_possible_truncation)]
                    let timeout_ms = limit.as_millis() as u64;
                    tracing::warn!(timeout_ms, "embedding call timed out");
                    Err(EmbeddingError::Timeout(timeout_ms))
                }
            },
            None => task.await.unwrap_or_else(|e| Err(join_failure(&e))),
        };
        metrics::histogram!(EMBEDDING_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
        result
    }

    /// Configured concurrency limit.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Calls currently queued for a permit.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Permits not currently held.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

fn join_failure(e: &JoinError) -> EmbeddingError {
    tracing::error!(error = %e, "embedding task failed");
    EmbeddingError::Internal(format!("embedding task failed: {e}"))
}

/// Counts a queued caller; decrements on drop so cancelled waiters are not leaked.
struct WaitingGuard<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> WaitingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(EMBEDDING_QUEUE_WAITING).set(now as f64);
        Self { counter }
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        let now = self.counter.fetch_sub(1, Ordering::SeqCst) - 1;
        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!(EMBEDDING_QUEUE_WAITING).set(now as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_result_through() {
        let gate = EmbeddingGate::new(2, None);
        let out = gate.run(async { Ok::<_, EmbeddingError>(41 + 1) }).await.unwrap();
        assert_eq!(out, 42);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test]
    async fn passes_error_through() {
        let gate = EmbeddingGate::new(1, None);
        let err = gate
            .run(async { Err::<(), _>(EmbeddingError::NotReady) })
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::NotReady));
        assert_eq!(gate.available(), 1);
    }

    #[test]
    fn zero_concurrency_clamped() {
        let gate = EmbeddingGate::new(0, None);
        assert_eq!(gate.max_concurrency(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_fails_only_slow_call() {
        let gate = EmbeddingGate::new(1, Some(Duration::from_millis(100)));
        let err = gate
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok::<_, EmbeddingError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Timeout(100)));

        // The slow call still holds its permit until it finishes.
        assert_eq!(gate.available(), 0);
        let ok = gate.run(async { Ok::<_, EmbeddingError>(1) }).await.unwrap();
        assert_eq!(ok, 1);
        assert_eq!(gate.available(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn timed_out_blocking_work_keeps_its_permit() {
        let gate = Arc::new(EmbeddingGate::new(1, Some(Duration::from_millis(20))));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let gate = Arc::clone(&gate);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                gate.run(async move {
                    tokio::task::spawn_blocking(move || {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        let _ = peak.fetch_max(now, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(120));
                        let _ = in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                    .await
                    .map_err(|e| EmbeddingError::Internal(e.to_string()))
                })
                .await
            }));
        }

        for handle in handles {
            let err = handle.await.unwrap().unwrap_err();
            assert!(matches!(err, EmbeddingError::Timeout(20)));
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_call_is_internal_error() {
        let gate = EmbeddingGate::new(1, None);
        let err = gate
            .run(async { Err::<(), _>(explode()) })
            .await
            .unwrap_err();
        assert!(matches!(err, EmbeddingError::Internal(_)));
        assert_eq!(gate.available(), 1);
    }

    fn explode() -> EmbeddingError {
        panic!("backend exploded")
    }

    #[tokio::test(start_paused = true)]
    async fn limits_concurrency_and_queues_excess() {
        let gate = Arc::new(EmbeddingGate::new(2, None));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..6 {
            let gate = Arc::clone(&gate);
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            handles.push(tokio::spawn(async move {
                gate.run(async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    let _ = peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    let _ = in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, EmbeddingError>(())
                })
                .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(gate.waiting(), 0);
        assert_eq!(gate.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_waiter_is_not_counted() {
        let gate = Arc::new(EmbeddingGate::new(1, None));

        let holder = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                gate.run(async {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    Ok::<_, EmbeddingError>(())
                })
                .await
            })
        };
        tokio::task::yield_now().await;

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.run(async { Ok::<_, EmbeddingError>(()) }).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(gate.waiting(), 1);

        waiter.abort();
        let _ = waiter.await;
        assert_eq!(gate.waiting(), 0);

        holder.await.unwrap().unwrap();
    }
}
