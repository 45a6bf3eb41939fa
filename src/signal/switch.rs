//! Switch-latest: one live run per trigger, newest wins.
//!
//! ```text
//! triggers:  T1 ───── T2 ───────────────
//! runs:      [run 1 ──╳ cancelled]
//!                     [run 2 ──────] → emit
//! ```
//!
//! A new trigger cancels the previous run's token and drops its signal, so a
//! superseded run can never emit, even if its work finishes later.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{FutureExt, Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::{Signal, SignalResult};

/// Handed to the run factory for every trigger.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Monotonic run number, starting at 1.
    pub id: u64,
    /// Cancelled as soon as a newer trigger supersedes this run.
    pub token: CancellationToken,
}

struct LiveRun<R> {
    id: u64,
    signal: Signal<R>,
    token: CancellationToken,
}

/// Start a new run on every trigger, discarding the previous one.
///
/// Failures on the trigger stream pass through unchanged. The stream ends
/// once the trigger stream has ended and the live run (if any) has emitted.
pub fn switch_latest<S, X, F, R>(triggers: S, factory: F) -> SwitchLatest<S, F, R>
where
    S: Stream<Item = SignalResult<X>> + Unpin,
    F: FnMut(RunContext) -> Signal<R>,
    R: Clone + Send + Sync + 'static,
{
    SwitchLatest {
        triggers: Some(triggers),
        factory,
        live: None,
        started: 0,
    }
}

/// Stream returned by [`switch_latest`].
pub struct SwitchLatest<S, F, R> {
    triggers: Option<S>,
    factory: F,
    live: Option<LiveRun<R>>,
    started: u64,
}

// No field is structurally pinned: the trigger stream is required to be Unpin.
impl<S: Unpin, F, R> Unpin for SwitchLatest<S, F, R> {}

impl<S, F, R> SwitchLatest<S, F, R>
where
    F: FnMut(RunContext) -> Signal<R>,
    R: Clone + Send + Sync + 'static,
{
    fn start_run(&mut self) {
        if let Some(stale) = self.live.take() {
            stale.token.cancel();
            crate::debug!("switch"; "run #{} superseded", stale.id);
        }

        self.started += 1;
        let token = CancellationToken::new();
        let signal = (self.factory)(RunContext {
            id: self.started,
            token: token.clone(),
        });
        crate::debug!("switch"; "run #{} started", self.started);

        self.live = Some(LiveRun {
            id: self.started,
            signal,
            token,
        });
    }

    /// Number of runs started so far.
    pub const fn started(&self) -> u64 {
        self.started
    }
}

impl<S, X, F, R> Stream for SwitchLatest<S, F, R>
where
    S: Stream<Item = SignalResult<X>> + Unpin,
    F: FnMut(RunContext) -> Signal<R>,
    R: Clone + Send + Sync + 'static,
{
    type Item = SignalResult<R>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        // Consume every ready trigger first: only the newest one gets to run.
        while let Some(triggers) = this.triggers.as_mut() {
            match triggers.poll_next_unpin(cx) {
                Poll::Ready(Some(Ok(_))) => this.start_run(),
                Poll::Ready(Some(Err(failure))) => return Poll::Ready(Some(Err(failure))),
                Poll::Ready(None) => this.triggers = None,
                Poll::Pending => break,
            }
        }

        if let Some(run) = this.live.as_mut() {
            return match run.signal.poll_unpin(cx) {
                Poll::Ready(result) => {
                    crate::debug!("switch"; "run #{} settled", run.id);
                    this.live = None;
                    Poll::Ready(Some(result))
                }
                Poll::Pending => Poll::Pending,
            };
        }

        if this.triggers.is_none() {
            return Poll::Ready(None);
        }
        Poll::Pending
    }
}
