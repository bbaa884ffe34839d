use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::models::Task;

/// Persistence port for the whole task list.
///
/// The list is always read and written as a single snapshot.
pub trait TaskStore {
    /// Loads all tasks. A store with nothing saved yet returns an empty list.
    fn load(&self) -> Result<Vec<Task>>;

    /// Replaces the stored snapshot with `tasks`.
    fn save(&self, tasks: &[Task]) -> Result<()>;
}

/// Stores tasks as a pretty-printed JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> JsonFileStore {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Task>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let s = fs::read_to_string(&self.path)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&s)?)
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        let s = serde_json::to_string_pretty(tasks)?;
        atomic_write(&self.path, &s)
    }
}

/// Writes `content` to a temp file next to `path`, then renames it into place.
fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    let mut temp_file = NamedTempFile::new_in(&dir)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.as_file().sync_all()?;
    temp_file
        .persist(path)
        .map_err(|e| Error::Persistence(format!("failed to persist {}: {}", path.display(), e)))?;
    Ok(())
}

/// In-memory store holding the serialized snapshot.
///
/// Clones share the same underlying snapshot, so a test can keep one handle and
/// inspect what the repository wrote through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// Creates a store pre-seeded with raw snapshot text (which may be invalid JSON).
    pub fn with_snapshot(raw: impl Into<String>) -> MemoryStore {
        let store = MemoryStore::default();
        if let Ok(mut guard) = store.snapshot.lock() {
            *guard = Some(raw.into());
        }
        store
    }

    /// Returns the last written snapshot text.
    pub fn snapshot(&self) -> Option<String> {
        self.snapshot.lock().ok().and_then(|s| s.clone())
    }

    /// Makes subsequent `save` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl TaskStore for MemoryStore {
    fn load(&self) -> Result<Vec<Task>> {
        match self.snapshot() {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Persistence("memory store is read-only".into()));
        }
        let s = serde_json::to_string(tasks)?;
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|_| Error::Persistence("memory store lock poisoned".into()))?;
        *guard = Some(s);
        Ok(())
    }
}
