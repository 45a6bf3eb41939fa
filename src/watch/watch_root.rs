use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

/// Outcome of a root consistency check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RootStatus {
    /// Nothing changed.
    Steady,
    /// The root disappeared since the last check.
    Lost,
    /// The root reappeared and is watched again.
    Restored,
}

/// Watch-root consistency manager. Owns the OS watch handle.
///
/// Responsibility:
/// - Attach the root at startup
/// - Notice when the root is removed, and watch its parent meanwhile
/// - Re-attach the root once it is recreated
pub(super) struct WatchRoot {
    path: PathBuf,
    watcher: RecommendedWatcher,
    attached: bool,
    parent_watched: bool,
}

impl WatchRoot {
    pub(super) fn new(path: PathBuf, watcher: RecommendedWatcher) -> Self {
        Self {
            path,
            watcher,
            attached: false,
            parent_watched: false,
        }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    pub(super) const fn is_attached(&self) -> bool {
        self.attached
    }

    pub(super) fn attach(&mut self) -> notify::Result<()> {
        self.watcher.watch(&self.path, RecursiveMode::Recursive)?;
        self.attached = true;
        Ok(())
    }

    pub(super) fn maintain(&mut self) -> RootStatus {
        if self.attached {
            if self.path.exists() {
                return RootStatus::Steady;
            }
            self.attached = false;
            let _ = self.watcher.unwatch(&self.path);
            // Parent events are the only way to hear about the root coming back.
            if let Some(parent) = self.path.parent()
                && self.watcher.watch(parent, RecursiveMode::NonRecursive).is_ok()
            {
                self.parent_watched = true;
            }
            return RootStatus::Lost;
        }

        if !self.path.exists() || self.attach().is_err() {
            return RootStatus::Steady;
        }
        if self.parent_watched
            && let Some(parent) = self.path.parent()
        {
            let _ = self.watcher.unwatch(parent);
            self.parent_watched = false;
        }
        crate::debug!("watch"; "re-attached watch: {}", self.path.display());
        RootStatus::Restored
    }
}
