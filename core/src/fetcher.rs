//! Reactive read queries.
//!
//! # Design
//! A `ResourceFetcher` owns a producer (an async closure returning
//! `Result<T, ApiError>`) and a `{data, loading, error}` state published
//! through a `tokio::sync::watch` channel. It activates on creation, on
//! every dependency change and on `refetch`. Each activation takes the next
//! generation number while holding the state lock, and commits its result
//! only if that number is still current, so a superseded activation can
//! never overwrite a newer one no matter when its response arrives.
//!
//! On failure the previous `data` is kept and `error` is set.
//!
//! Activations are spawned with `tokio::spawn`; every method that activates
//! must be called from within a Tokio runtime.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::ApiError;

/// Observable state of a query or mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<ApiError>,
}

impl<T> QueryState<T> {
    /// Initial state of a query: nothing yet, first fetch under way.
    pub fn pending() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
        }
    }

    /// Initial state of a mutation: nothing requested yet.
    pub fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
        }
    }
}

pub(crate) type Producer<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// Start a producer and guard its future. A panic while building the
/// future or while polling it becomes `ApiError::Unknown`.
pub(crate) fn start_guarded<T, F>(start: F) -> BoxFuture<'static, Result<T, ApiError>>
where
    T: Send + 'static,
    F: FnOnce() -> BoxFuture<'static, Result<T, ApiError>>,
{
    match std::panic::catch_unwind(AssertUnwindSafe(start)) {
        Ok(future) => AssertUnwindSafe(future)
            .catch_unwind()
            .map(|outcome| outcome.unwrap_or(Err(ApiError::Unknown)))
            .boxed(),
        Err(_) => futures::future::ready(Err(ApiError::Unknown)).boxed(),
    }
}

/// A read query that re-runs whenever its dependencies change.
pub struct ResourceFetcher<T, D> {
    producer: Producer<T>,
    state: Arc<watch::Sender<QueryState<T>>>,
    generation: Arc<AtomicU64>,
    dependencies: D,
}

impl<T, D> ResourceFetcher<T, D>
where
    T: Send + Sync + 'static,
    D: PartialEq,
{
    /// Create the fetcher and start its first activation.
    pub fn observe<F, Fut>(producer: F, dependencies: D) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (state, _) = watch::channel(QueryState::pending());
        let fetcher = Self {
            producer: Arc::new(move || producer().boxed()),
            state: Arc::new(state),
            generation: Arc::new(AtomicU64::new(0)),
            dependencies,
        };
        fetcher.activate();
        fetcher
    }

    pub fn dependencies(&self) -> &D {
        &self.dependencies
    }

    /// Replace the dependency values. Activates only when they differ from
    /// the current ones; returns the spawned activation if there was one.
    pub fn set_dependencies(&mut self, dependencies: D) -> Option<JoinHandle<()>> {
        if self.dependencies == dependencies {
            return None;
        }
        self.dependencies = dependencies;
        Some(self.activate())
    }

    /// Activate unconditionally.
    pub fn refetch(&self) -> JoinHandle<()> {
        self.activate()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    fn activate(&self) -> JoinHandle<()> {
        let mut token = 0;
        self.state.send_modify(|state| {
            token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
            state.error = None;
        });

        let future = start_guarded(|| (self.producer)());
        let state = Arc::clone(&self.state);
        let generation = Arc::clone(&self.generation);
        tokio::spawn(async move {
            let outcome = future.await;
            state.send_if_modified(|state| {
                if generation.load(Ordering::SeqCst) != token {
                    tracing::debug!(token, "discarding superseded fetch result");
                    return false;
                }
                state.loading = false;
                match outcome {
                    Ok(data) => state.data = Some(data),
                    Err(e) => state.error = Some(e),
                }
                true
            });
        })
    }
}

impl<T, D> ResourceFetcher<T, D>
where
    T: Clone + Send + Sync + 'static,
    D: PartialEq,
{
    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<T> {
        (*self.state.borrow()).clone()
    }

    /// Wait until no activation is loading, then return the state.
    pub async fn settled(&self) -> QueryState<T> {
        let mut rx = self.state.subscribe();
        let settled = rx.wait_for(|state| !state.loading).await.map(|s| (*s).clone());
        settled.unwrap_or_else(|_| self.state())
    }
}

impl<T, D> Drop for ResourceFetcher<T, D> {
    fn drop(&mut self) {
        // Invalidate every in-flight activation; their results are dropped.
        let generation = &self.generation;
        self.state.send_if_modified(|_| {
            generation.fetch_add(1, Ordering::SeqCst);
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    /// Producer whose n-th invocation resolves when the n-th sender fires.
    fn gated(count: usize) -> (Vec<oneshot::Sender<Result<i32, ApiError>>>, impl Fn() -> BoxFuture<'static, Result<i32, ApiError>> + Send + Sync) {
        let mut senders = Vec::new();
        let mut receivers = VecDeque::new();
        for _ in 0..count {
            let (tx, rx) = oneshot::channel();
            senders.push(tx);
            receivers.push_back(rx);
        }
        let receivers = Mutex::new(receivers);
        let producer = move || {
            let rx = receivers.lock().unwrap().pop_front().expect("more activations than gates");
            async move { rx.await.unwrap_or(Err(ApiError::Unknown)) }.boxed()
        };
        (senders, producer)
    }

    #[tokio::test]
    async fn starts_loading_then_holds_data() {
        let fetcher = ResourceFetcher::observe(|| async { Ok::<_, ApiError>(vec![1, 2, 3]) }, ());
        assert!(fetcher.state().loading);
        assert!(fetcher.state().data.is_none());

        let state = fetcher.settled().await;
        assert_eq!(state.data, Some(vec![1, 2, 3]));
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn superseded_refetch_never_overwrites_latest() {
        let (mut gates, producer) = gated(3);
        let fetcher = ResourceFetcher::observe(producer, ());
        gates.remove(0).send(Ok(0)).unwrap();
        assert_eq!(fetcher.settled().await.data, Some(0));

        let first = fetcher.refetch();
        let second = fetcher.refetch();
        let first_gate = gates.remove(0);
        let second_gate = gates.remove(0);

        second_gate.send(Ok(2)).unwrap();
        second.await.unwrap();
        assert_eq!(fetcher.state().data, Some(2));
        assert!(!fetcher.state().loading);

        first_gate.send(Ok(1)).unwrap();
        first.await.unwrap();
        let state = fetcher.state();
        assert_eq!(state.data, Some(2));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn stale_failure_does_not_clobber_newer_success() {
        let (mut gates, producer) = gated(2);
        let fetcher = ResourceFetcher::observe(producer, ());
        let latest = fetcher.refetch();

        gates.remove(1).send(Ok(7)).unwrap();
        latest.await.unwrap();
        gates.remove(0).send(Err(ApiError::MissingSession)).unwrap();
        tokio::task::yield_now().await;

        let state = fetcher.settled().await;
        assert_eq!(state.data, Some(7));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_previous_data() {
        let (mut gates, producer) = gated(2);
        let fetcher = ResourceFetcher::observe(producer, ());
        gates.remove(0).send(Ok(5)).unwrap();
        fetcher.settled().await;

        let handle = fetcher.refetch();
        assert!(fetcher.state().loading);
        gates
            .remove(0)
            .send(Err(ApiError::from_status(500, Some("boom".into()), None)))
            .unwrap();
        handle.await.unwrap();

        let state = fetcher.state();
        assert_eq!(state.data, Some(5));
        assert_eq!(state.error.map(|e| e.to_string()), Some("boom".to_string()));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn refetch_clears_previous_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = ResourceFetcher::observe(
            move || {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(ApiError::Transport {
                            message: "connection refused".into(),
                        })
                    } else {
                        Ok(n)
                    }
                }
            },
            (),
        );
        assert!(fetcher.settled().await.error.is_some());

        fetcher.refetch().await.unwrap();
        let state = fetcher.state();
        assert!(state.error.is_none());
        assert_eq!(state.data, Some(1));
    }

    #[tokio::test]
    async fn panicking_producer_reports_unknown_error() {
        let fetcher: ResourceFetcher<i32, ()> = ResourceFetcher::observe(
            || async {
                if true {
                    panic!("producer blew up");
                }
                Ok(1)
            },
            (),
        );
        let state = fetcher.settled().await;
        assert_eq!(state.error, Some(ApiError::Unknown));
        assert_eq!(state.error.unwrap().to_string(), "unknown error");
    }

    #[tokio::test]
    async fn producer_panicking_before_its_future_is_contained() {
        let fetcher: ResourceFetcher<i32, ()> =
            ResourceFetcher::observe(|| -> futures::future::Ready<Result<i32, ApiError>> { panic!("no future") }, ());
        let state = fetcher.settled().await;
        assert_eq!(state.error, Some(ApiError::Unknown));
        assert!(state.data.is_none());
    }

    #[tokio::test]
    async fn dependency_change_triggers_exactly_one_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut fetcher = ResourceFetcher::observe(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ApiError>(()) }
            },
            vec![None::<String>],
        );
        fetcher.settled().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let handle = fetcher.set_dependencies(vec![Some("h1".to_string())]);
        handle.expect("changed dependencies must activate").await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        assert!(fetcher.set_dependencies(vec![Some("h1".to_string())]).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.dependencies(), &vec![Some("h1".to_string())]);

        fetcher.refetch().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn dropped_fetcher_discards_pending_results() {
        let (mut gates, producer) = gated(2);
        let fetcher = ResourceFetcher::observe(producer, ());
        let pending = fetcher.refetch();
        let rx = fetcher.subscribe();
        drop(fetcher);

        gates.remove(1).send(Ok(9)).unwrap();
        pending.await.unwrap();
        gates.remove(0).send(Ok(8)).unwrap();
        tokio::task::yield_now().await;

        let state = rx.borrow().clone();
        assert!(state.data.is_none());
        assert!(state.loading);
    }

    #[tokio::test]
    async fn subscribers_observe_loading_transition() {
        let (mut gates, producer) = gated(1);
        let fetcher = ResourceFetcher::observe(producer, ());
        let mut rx = fetcher.subscribe();
        assert!(rx.borrow_and_update().loading);

        gates.remove(0).send(Ok(3)).unwrap();
        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert!(!state.loading);
        assert_eq!(state.data, Some(3));
    }
}
