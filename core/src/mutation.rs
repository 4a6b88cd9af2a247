//! Explicitly triggered write commands.
//!
//! # Design
//! A `MutationExecutor` wraps an async producer taking one parameter value
//! (use a tuple for several) and publishes the same `QueryState` shape as a
//! fetcher, starting idle. Nothing runs until `mutate` is called. Failures
//! are reported through the state and a `None` result, never as an `Err`.
//!
//! Overlapping `mutate` calls on one executor are not ordered: each writes
//! the state when it finishes, so the last to finish wins.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;

use crate::error::ApiError;
use crate::fetcher::{start_guarded, QueryState};

pub type MutationState<T> = QueryState<T>;

type Command<P, T> = Arc<dyn Fn(P) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

pub struct MutationExecutor<P, T> {
    producer: Command<P, T>,
    state: Arc<watch::Sender<MutationState<T>>>,
}

impl<P, T> Clone for MutationExecutor<P, T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
            state: Arc::clone(&self.state),
        }
    }
}

impl<P, T> MutationExecutor<P, T>
where
    P: 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn bind<F, Fut>(producer: F) -> Self
    where
        F: Fn(P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (state, _) = watch::channel(MutationState::idle());
        Self {
            producer: Arc::new(move |params| producer(params).boxed()),
            state: Arc::new(state),
        }
    }

    /// Run the producer once. Resolves to the result on success and to
    /// `None` on failure, with the error left in the state.
    pub async fn mutate(&self, params: P) -> Option<T> {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let mut in_flight = InFlight {
            state: &self.state,
            settled: false,
        };
        let outcome = start_guarded(|| (self.producer)(params)).await;
        in_flight.settled = true;

        match outcome {
            Ok(data) => {
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.data = Some(data.clone());
                });
                Some(data)
            }
            Err(e) => {
                tracing::warn!(error = %e, "mutation failed");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(e);
                });
                None
            }
        }
    }

    pub fn state(&self) -> MutationState<T> {
        (*self.state.borrow()).clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.state.subscribe()
    }
}

/// Clears `loading` when a `mutate` call is dropped before it settles.
struct InFlight<'a, T> {
    state: &'a watch::Sender<MutationState<T>>,
    settled: bool,
}

impl<T> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            self.state.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
        }
    }
}
