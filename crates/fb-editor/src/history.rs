//! Undo history of full diagram snapshots.
//!
//! Every mutating gesture pushes a deep copy of the diagram immediately
//! before its first change; continuous drags and resizes share the one
//! snapshot taken at gesture start. Undo pops the newest snapshot, so there
//! is never a redo tail to truncate.
//!
//! While a snapshot is being restored the stack refuses pushes, so code
//! that runs during the restore cannot record the restore itself.

use fb_core::Diagram;
use std::collections::VecDeque;

/// Default number of retained snapshots.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<Diagram>,
    capacity: usize,
    restoring: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_DEPTH)),
            capacity: capacity.max(1),
            restoring: false,
        }
    }

    /// Record `diagram`. Returns `false` (and records nothing) while a
    /// restore is in progress. The oldest snapshot is evicted at capacity.
    pub fn push(&mut self, diagram: &Diagram) -> bool {
        if self.restoring {
            log::trace!("history push suppressed during restore");
            return false;
        }
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(diagram.clone());
        log::trace!("history depth {}", self.snapshots.len());
        true
    }

    /// Take the newest snapshot and hold the restore guard until
    /// [`History::end_restore`]. `None` when there is nothing to undo.
    pub fn begin_restore(&mut self) -> Option<Diagram> {
        let snapshot = self.snapshots.pop_back()?;
        self.restoring = true;
        Some(snapshot)
    }

    pub fn end_restore(&mut self) {
        self.restoring = false;
    }

    pub fn is_restoring(&self) -> bool {
        self.restoring
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
