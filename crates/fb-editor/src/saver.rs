//! Storage port and save debouncing.
//!
//! The diagram lives in one record. Writes are coalesced: every change
//! pushes the deadline out, and the host's tick flushes once it passes.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("cannot encode diagram: {0}")]
    Encode(#[from] fb_core::Error),
}

/// Holds the single persisted record.
pub trait Storage {
    /// The stored record, or `None` if nothing was ever written.
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&mut self, record: &str) -> Result<(), StorageError>;
}

// ─── In-memory storage ───────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryState {
    record: Option<String>,
    writes: usize,
    fail_writes: bool,
}

/// Shared in-memory record. Clones see the same record, so a host can
/// keep a handle after moving one into the editor.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.state.borrow_mut().record = Some(record.into());
        storage
    }

    pub fn record(&self) -> Option<String> {
        self.state.borrow().record.clone()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }

    /// Make subsequent writes fail, as a full quota would.
    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        Ok(self.record())
    }

    fn write(&mut self, record: &str) -> Result<(), StorageError> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(StorageError::Unavailable("quota exceeded".into()));
        }
        state.record = Some(record.to_string());
        state.writes += 1;
        Ok(())
    }
}

// ─── File storage ────────────────────────────────────────────────────────

/// Record kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, record: &str) -> Result<(), StorageError> {
        // Write-then-rename so a crash never leaves half a record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, record)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

// ─── Debounce ────────────────────────────────────────────────────────────

/// Trailing-edge debounce deadline.
#[derive(Debug, Clone)]
pub struct SaveDebouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SaveDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)arm the deadline `delay` after `now`, superseding any pending one.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_change_supersedes_pending_deadline() {
        let t0 = Instant::now();
        let mut d = SaveDebouncer::new(Duration::from_secs(1));
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(600));
        assert!(!d.take_due(t0 + Duration::from_millis(1000)));
        assert!(d.take_due(t0 + Duration::from_millis(1600)));
        assert!(!d.is_pending());
    }

    #[test]
    fn memory_clones_share_the_record() {
        let handle = MemoryStorage::new();
        let mut boxed: Box<dyn Storage> = Box::new(handle.clone());
        boxed.write("{}").unwrap();
        assert_eq!(handle.record().as_deref(), Some("{}"));
        assert_eq!(handle.writes(), 1);

        handle.fail_writes(true);
        assert!(boxed.write("{\"x\":1}").is_err());
        assert_eq!(handle.record().as_deref(), Some("{}"));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let storage = FileStorage::new(std::env::temp_dir().join("flowboard-does-not-exist.json"));
        assert!(storage.read().unwrap().is_none());
    }
}
