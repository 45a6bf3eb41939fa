//! Time-varying asynchronous values.
//!
//! ```text
//! Signal<T>         one shared asynchronous production of T or a Failure
//! combine3          join three signals, merge once all resolved
//! CombineLatest3    latest-value-wins join of three multi-value streams
//! SwitchLatest      per-trigger runs, only the newest may emit
//! ```
//!
//! A [`Signal`] is lazy: its work starts when first polled, and every clone
//! observes the same underlying computation.

mod combine;
mod switch;


use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::stream::{BoxStream, StreamExt};

use crate::core::Failure;

pub use combine::{CombineLatest3, combine_latest3, combine3};
pub use switch::{RunContext, SwitchLatest, switch_latest};

/// Value or failure produced by one asynchronous step.
pub type SignalResult<T> = Result<T, Failure>;

/// Observable state of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    Pending,
    Resolved,
    Failed,
}

/// A single asynchronously produced value with a separate failure channel.
///
/// Once resolved or failed the state never changes again.
#[must_use = "signals are lazy and failures must be observed"]
pub struct Signal<T> {
    inner: Shared<BoxFuture<'static, SignalResult<T>>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap an asynchronous production.
    pub fn from_future<F>(future: F) -> Self
    where
        F: Future<Output = SignalResult<T>> + Send + 'static,
    {
        Self {
            inner: future.boxed().shared(),
        }
    }

    pub fn resolved(value: T) -> Self {
        Self::from_future(futures::future::ready(Ok(value)))
    }

    pub fn failed(failure: Failure) -> Self {
        Self::from_future(futures::future::ready(Err(failure)))
    }

    /// Derive a new signal from the resolved value. Failures pass through.
    pub fn map<U, F>(self, f: F) -> Signal<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Signal::from_future(async move { self.await.map(f) })
    }

    /// Chain asynchronous work: once resolved, adopt the state of the signal
    /// returned by `f`. A failure in either layer propagates.
    pub fn flat_map<U, F>(self, f: F) -> Signal<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Signal<U> + Send + 'static,
    {
        Signal::from_future(async move {
            let value = self.await?;
            f(value).await
        })
    }

    /// Current state without driving the computation.
    pub fn state(&self) -> SignalState {
        match self.inner.peek() {
            None => SignalState::Pending,
            Some(Ok(_)) => SignalState::Resolved,
            Some(Err(_)) => SignalState::Failed,
        }
    }

    /// Single-item stream view, for stream combinators.
    pub fn into_stream(self) -> BoxStream<'static, SignalResult<T>> {
        futures::stream::once(self).boxed()
    }
}

impl<T: Clone> Future for Signal<T> {
    type Output = SignalResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}
