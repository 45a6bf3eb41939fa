use std::path::PathBuf;

use rustc_hash::FxHashSet;

use crate::core::Trigger;
use crate::utils::path::{is_temp_file, normalize_path};

/// Pure coalescing state: collects changed paths until a trigger is taken.
/// No timing, no I/O.
pub(super) struct Debouncer {
    /// Changed paths since the last trigger (dedup is free via set membership)
    pub(super) pending: FxHashSet<PathBuf>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            pending: FxHashSet::default(),
        }
    }

    /// Add a notify event. Returns whether it counts as a change.
    ///
    /// Access notifications, metadata-only modifications (mtime/chmod noise)
    /// and editor artifacts are ignored.
    pub(super) fn add_event(&mut self, event: &notify::Event) -> bool {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match event.kind {
            EventKind::Create(_) | EventKind::Remove(_) => {}
            EventKind::Modify(ModifyKind::Metadata(_)) => return false,
            EventKind::Modify(_) => {}
            _ => return false,
        }

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        let mut relevant = false;
        for path in &event.paths {
            if is_temp_file(path) {
                continue;
            }
            self.pending.insert(normalize_path(path));
            relevant = true;
        }
        relevant
    }

    /// Record a change that did not come from a notify event.
    pub(super) fn mark(&mut self, path: PathBuf) {
        self.pending.insert(path);
    }

    pub(super) fn clear(&mut self) {
        self.pending.clear();
    }

    /// Collapse everything collected so far into one trigger.
    pub(super) fn take(&mut self) -> Option<Trigger> {
        if self.pending.is_empty() {
            return None;
        }
        let changed = std::mem::take(&mut self.pending);
        crate::debug!("watch"; "{} path(s) changed", changed.len());
        Some(Trigger)
    }
}
