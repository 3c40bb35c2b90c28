// Debounced autosave: edits mark the draft dirty, the tick loop flushes it
// once typing has paused for the configured delay

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct AutosaveDebouncer {
    delay: Duration,
    dirty_since: Option<Instant>, // time of the most recent unsaved edit
}

impl AutosaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            dirty_since: None,
        }
    }

    /// Record an edit. Each edit pushes the save further out.
    pub fn mark_dirty(&mut self, now: Instant) {
        self.dirty_since = Some(now);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    /// True once the draft is dirty and no edit happened for `delay`.
    pub fn should_flush(&self, now: Instant) -> bool {
        self.dirty_since
            .is_some_and(|last_edit| now.saturating_duration_since(last_edit) >= self.delay)
    }

    /// Call after the draft was saved.
    pub fn flushed(&mut self) {
        self.dirty_since = None;
    }
}
