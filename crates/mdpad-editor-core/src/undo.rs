//! Snapshot-based undo/redo.
//!
//! History is a stack of [`Snapshot`]s plus an index. Entries are compared by
//! text only; a push equal to the current entry is a no-op. Typing is
//! debounced: [`History::schedule`] parks a snapshot that becomes an entry
//! once its quiet period has elapsed, or earlier when something forces it.

use std::time::Duration;

use web_time::Instant;

use crate::lines::LineStore;
use crate::types::Selection;

/// Document and selection at one point in time.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub lines: LineStore,
    pub selection: Selection,
}

#[derive(Clone, Debug)]
struct Pending {
    snapshot: Snapshot,
    due: Instant,
}

#[derive(Clone, Debug)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    limit: usize,
    debounce: Duration,
    pending: Option<Pending>,
}

impl History {
    /// History whose first entry is `initial`. `limit` is clamped to at least 1.
    pub fn new(initial: Snapshot, limit: usize, debounce: Duration) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: limit.max(1),
            debounce,
            pending: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; there is at least the initial entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Snapshot {
        &self.entries[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0 || self.pending.is_some()
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Append `snapshot` unless its text equals the current entry's. Anything
    /// beyond the current index is discarded first. Returns whether an entry
    /// was added.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if snapshot.lines.text_eq(&self.entries[self.index].lines) {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.index = self.entries.len() - 1;
        tracing::trace!(target: "mdpad::history", index = self.index, len = self.entries.len(), "push");
        true
    }

    /// Park `snapshot` until `now + debounce`, replacing any parked snapshot.
    pub fn schedule(&mut self, snapshot: Snapshot, now: Instant) {
        self.pending = Some(Pending {
            snapshot,
            due: now + self.debounce,
        });
    }

    /// Push the parked snapshot now, whatever its deadline.
    pub fn commit_pending(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) => self.push(pending.snapshot),
            None => false,
        }
    }

    /// Push the parked snapshot if its deadline has passed.
    pub fn commit_due(&mut self, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if pending.due <= now => self.commit_pending(),
            _ => false,
        }
    }

    /// Step back. `current` is pushed first so redo can return to it. Returns
    /// the snapshot to restore, or `None` at the oldest entry.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        self.commit_pending();
        self.push(current);
        if self.index == 0 {
            return None;
        }
        self.index -= 1;
        tracing::debug!(target: "mdpad::history", index = self.index, "undo");
        Some(self.entries[self.index].clone())
    }

    /// Step forward, or `None` at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        tracing::debug!(target: "mdpad::history", index = self.index, "redo");
        Some(self.entries[self.index].clone())
    }
}
