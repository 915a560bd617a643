use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;

use crate::error::NetworkError;

type SharedOp<T> = Shared<BoxFuture<'static, Result<T, NetworkError>>>;

/// Collapses overlapping calls with the same key into a single in-flight
/// operation whose one outcome (value or error) every caller observes.
///
/// The registry entry is removed as soon as the operation completes, so a
/// later call re-executes instead of replaying a stale result. Entries are
/// generation-tagged: a caller finishing late must not evict a successor
/// registered under the same key.
pub struct RequestDeduper<T: Clone> {
    tasks: Mutex<HashMap<String, (u64, SharedOp<T>)>>,
    next_generation: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> RequestDeduper<T> {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub async fn run<F, Fut>(&self, key: &str, operation: F) -> Result<T, NetworkError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, NetworkError>> + Send + 'static,
    {
        let (generation, shared) = {
            let mut tasks = self.tasks.lock();
            if let Some((generation, shared)) = tasks.get(key) {
                (*generation, shared.clone())
            } else {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let shared = operation().boxed().shared();
                tasks.insert(key.to_string(), (generation, shared.clone()));
                (generation, shared)
            }
        };

        let result = shared.await;

        let mut tasks = self.tasks.lock();
        if let Some((stored, _)) = tasks.get(key) {
            if *stored == generation {
                tasks.remove(key);
            }
        }
        result
    }

    #[cfg(test)]
    fn in_flight(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for RequestDeduper<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn concurrent_calls_execute_the_operation_once() {
        let deduper = Arc::new(RequestDeduper::<u32>::new());
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let deduper = deduper.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                deduper
                    .run("markets_1_100_market_cap_desc_all", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(42));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(deduper.in_flight(), 0);
    }

    #[tokio::test]
    async fn errors_are_broadcast_to_every_waiter() {
        let deduper = Arc::new(RequestDeduper::<u32>::new());

        let mut handles = Vec::new();
        for _ in 0..4 {
            let deduper = deduper.clone();
            handles.push(tokio::spawn(async move {
                deduper
                    .run("details_bitcoin", || async {
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err(NetworkError::Server { status: 500 })
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(
                handle.await.unwrap(),
                Err(NetworkError::Server { status: 500 })
            );
        }
    }

    #[tokio::test]
    async fn completed_key_re_executes() {
        let deduper = RequestDeduper::<u32>::new();
        let calls = AtomicU32::new(0);

        for expected in [1, 2] {
            let result = deduper
                .run("chart_bitcoin_7d", || {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move { Ok(n) }
                })
                .await;
            assert_eq!(result, Ok(expected));
        }
    }

    #[tokio::test]
    async fn distinct_keys_run_independently() {
        let deduper = Arc::new(RequestDeduper::<u32>::new());
        let calls = Arc::new(AtomicU32::new(0));

        let a = {
            let deduper = deduper.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                deduper
                    .run("details_bitcoin", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok(1)
                    })
                    .await
            })
        };
        let b = {
            let deduper = deduper.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                deduper
                    .run("details_ethereum", move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok(2)
                    })
                    .await
            })
        };

        assert_eq!(a.await.unwrap(), Ok(1));
        assert_eq!(b.await.unwrap(), Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
