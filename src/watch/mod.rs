//! ChangeSource: filesystem notifications → debounced trigger stream.
//!
//! ```text
//! notify watcher → unbounded channel → Debouncer (coalesce one turn) → Trigger
//!                                     → WatchRoot (root lost / restored)
//! ```
//!
//! The source is process-scoped. Dropping it (or the stream it became)
//! closes the OS watch handle. No history is buffered: a trigger is only
//! produced for notifications received after the watch was attached.

mod debouncer;
mod watch_root;

#[cfg(test)]
mod tests;

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;
use futures::stream::BoxStream;
use tokio::sync::mpsc;

use crate::core::{Failure, Stage, Trigger};
use crate::signal::SignalResult;
use crate::utils::path::normalize_path;
use debouncer::Debouncer;
use watch_root::{RootStatus, WatchRoot};

/// Unbounded, time-ordered stream of debounced triggers.
pub type TriggerStream = BoxStream<'static, SignalResult<Trigger>>;

type NotifyResult = notify::Result<notify::Event>;

/// Subscribe to changes under `root` (recursively).
pub fn observe_changes(root: &Path, window: Duration) -> SignalResult<TriggerStream> {
    Ok(ChangeSource::new(root, window)?.into_stream())
}

/// Debounced view of the filesystem notifications under one root.
pub struct ChangeSource {
    /// Receives notify events (the sender lives inside the watcher callback)
    events: mpsc::UnboundedReceiver<NotifyResult>,
    debouncer: Debouncer,
    /// Quiescence window; zero coalesces only what is ready in the same turn
    window: Duration,
    /// Owns the watch handle; absent when fed by a test channel
    root: Option<WatchRoot>,
    /// Watch failures waiting to be emitted ahead of the next trigger
    failures: Vec<Failure>,
}

impl ChangeSource {
    /// Start watching `root`. Notifications buffer from this point on.
    pub fn new(root: &Path, window: Duration) -> SignalResult<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(|e| Failure::error(Stage::Watch, format!("watcher failed: {e}")))?;

        let path = normalize_path(root);
        let mut watch_root = WatchRoot::new(path, watcher);
        watch_root.attach().map_err(|e| {
            Failure::error(
                Stage::Watch,
                format!("failed to watch {}: {e}", watch_root.path().display()),
            )
        })?;
        crate::debug!("watch"; "watching {}", watch_root.path().display());

        let mut source = Self::from_events(rx, window);
        source.root = Some(watch_root);
        Ok(source)
    }

    /// Build a source over an arbitrary notification channel.
    pub(crate) fn from_events(events: mpsc::UnboundedReceiver<NotifyResult>, window: Duration) -> Self {
        Self {
            events,
            debouncer: Debouncer::new(),
            window,
            root: None,
            failures: Vec::new(),
        }
    }

    /// Wait for the next logical trigger.
    ///
    /// Returns `None` once the notification channel is closed.
    pub async fn next_trigger(&mut self) -> Option<SignalResult<Trigger>> {
        loop {
            if !self.failures.is_empty() {
                let failures = std::mem::take(&mut self.failures);
                return Some(Err(Failure::merge(failures)));
            }
            if let Some(trigger) = self.debouncer.take() {
                return Some(Ok(trigger));
            }

            let event = self.events.recv().await?;
            self.accept(event);
            self.settle().await;
            self.maintain_root();
        }
    }

    pub fn into_stream(self) -> TriggerStream {
        futures::stream::unfold(self, |mut source| async move {
            let item = source.next_trigger().await?;
            Some((item, source))
        })
        .boxed()
    }

    /// Absorb the rest of the burst that started with the event just accepted.
    async fn settle(&mut self) {
        if self.window.is_zero() {
            self.drain();
            tokio::task::yield_now().await;
            self.drain();
            return;
        }

        loop {
            self.drain();
            match tokio::time::timeout(self.window, self.events.recv()).await {
                Ok(Some(event)) => self.accept(event),
                Ok(None) | Err(_) => return,
            }
        }
    }

    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.accept(event);
        }
    }

    fn accept(&mut self, event: NotifyResult) {
        match event {
            Ok(event) => {
                self.debouncer.add_event(&event);
            }
            Err(e) => {
                crate::debug!("watch"; "notify error: {}", e);
                self.failures
                    .push(Failure::error(Stage::Watch, format!("notify error: {e}")));
            }
        }
    }

    fn maintain_root(&mut self) {
        let Some(root) = self.root.as_mut() else {
            return;
        };

        match root.maintain() {
            RootStatus::Steady => {}
            RootStatus::Lost => {
                self.failures.push(Failure::error(
                    Stage::Watch,
                    format!("watched root removed: {}", root.path().display()),
                ));
            }
            RootStatus::Restored => {
                self.debouncer.mark(root.path().to_path_buf());
                return;
            }
        }

        // Sibling noise from the parent watch while the root is gone.
        if !root.is_attached() {
            self.debouncer.clear();
        }
    }
}

impl Drop for ChangeSource {
    fn drop(&mut self) {
        if let Some(root) = &self.root {
            crate::debug!("watch"; "closing watch on {}", root.path().display());
        }
    }
}
