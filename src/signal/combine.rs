//! Joining independent signals.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{BoxStream, Stream, StreamExt};

use super::{Signal, SignalResult};
use crate::core::Failure;

/// Join three signals and merge their values once all have resolved.
///
/// The inputs are driven concurrently and may resolve in any order. If any
/// input fails, the result fails with the failures of *every* failed input,
/// collected after all inputs have settled.
pub fn combine3<A, B, C, R, F>(a: Signal<A>, b: Signal<B>, c: Signal<C>, merge: F) -> Signal<R>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    F: FnOnce(A, B, C) -> R + Send + 'static,
{
    Signal::from_future(async move {
        let (a, b, c) = futures::future::join3(a, b, c).await;

        let mut failures = Vec::new();
        let a = settle(a, &mut failures);
        let b = settle(b, &mut failures);
        let c = settle(c, &mut failures);

        match (a, b, c) {
            (Some(a), Some(b), Some(c)) => Ok(merge(a, b, c)),
            _ => Err(Failure::merge(failures)),
        }
    })
}

fn settle<T>(result: SignalResult<T>, failures: &mut Vec<Failure>) -> Option<T> {
    result.map_err(|failure| failures.push(failure)).ok()
}

/// Latest-value-wins join of three multi-value streams.
///
/// Emits nothing until every input has produced a value, then re-derives
/// with the latest value of each input whenever any of them produces a new
/// one. Failures that become ready in the same poll are merged into a single
/// item; the stream keeps running after a failure.
pub fn combine_latest3<A, B, C, R, F>(
    a: BoxStream<'static, SignalResult<A>>,
    b: BoxStream<'static, SignalResult<B>>,
    c: BoxStream<'static, SignalResult<C>>,
    merge: F,
) -> CombineLatest3<A, B, C, F>
where
    A: Clone,
    B: Clone,
    C: Clone,
    F: FnMut(A, B, C) -> R,
{
    CombineLatest3 {
        a: Slot::new(a),
        b: Slot::new(b),
        c: Slot::new(c),
        merge,
        dirty: false,
    }
}

/// Stream returned by [`combine_latest3`].
pub struct CombineLatest3<A, B, C, F> {
    a: Slot<A>,
    b: Slot<B>,
    c: Slot<C>,
    merge: F,
    /// A new value arrived since the last emission.
    dirty: bool,
}

// Fields are never pinned: the input streams are boxed and values are moved.
impl<A, B, C, F> Unpin for CombineLatest3<A, B, C, F> {}

struct Slot<T> {
    stream: Option<BoxStream<'static, SignalResult<T>>>,
    latest: Option<T>,
}

impl<T> Slot<T> {
    fn new(stream: BoxStream<'static, SignalResult<T>>) -> Self {
        Self {
            stream: Some(stream),
            latest: None,
        }
    }

    /// Drain every ready item. Returns whether a new value was stored.
    fn poll_drain(&mut self, cx: &mut Context<'_>, failures: &mut Vec<Failure>) -> bool {
        let mut updated = false;
        while let Some(stream) = self.stream.as_mut() {
            match stream.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(value))) => {
                    self.latest = Some(value);
                    updated = true;
                }
                Poll::Ready(Some(Err(failure))) => failures.push(failure),
                Poll::Ready(None) => self.stream = None,
                Poll::Pending => break,
            }
        }
        updated
    }

    fn is_done(&self) -> bool {
        self.stream.is_none()
    }
}

impl<A, B, C, R, F> Stream for CombineLatest3<A, B, C, F>
where
    A: Clone,
    B: Clone,
    C: Clone,
    F: FnMut(A, B, C) -> R,
{
    type Item = SignalResult<R>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let mut failures = Vec::new();

        // Non-short-circuiting: every input must register its waker.
        let fresh_a = this.a.poll_drain(cx, &mut failures);
        let fresh_b = this.b.poll_drain(cx, &mut failures);
        let fresh_c = this.c.poll_drain(cx, &mut failures);
        this.dirty |= fresh_a | fresh_b | fresh_c;

        if !failures.is_empty() {
            return Poll::Ready(Some(Err(Failure::merge(failures))));
        }

        if this.dirty
            && let (Some(a), Some(b), Some(c)) = (&this.a.latest, &this.b.latest, &this.c.latest)
        {
            this.dirty = false;
            let merged = (this.merge)(a.clone(), b.clone(), c.clone());
            return Poll::Ready(Some(Ok(merged)));
        }

        let all_done = this.a.is_done() && this.b.is_done() && this.c.is_done();
        let starved = [
            this.a.is_done() && this.a.latest.is_none(),
            this.b.is_done() && this.b.latest.is_none(),
            this.c.is_done() && this.c.latest.is_none(),
        ]
        .into_iter()
        .any(|starved| starved);

        if all_done || starved {
            return Poll::Ready(None);
        }
        Poll::Pending
    }
}
