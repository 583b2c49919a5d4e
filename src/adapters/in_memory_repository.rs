//! In-memory table repository for testing.
//!
//! Stores encoded tables in a shared map so tests exercise the same format
//! as the file repository without touching the file system.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{Error, Result, ports::TableRepository, q_learning::QTable};

/// In-memory repository for testing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
///
/// use tilemind::adapters::InMemoryRepository;
/// use tilemind::ports::TableRepository;
/// use tilemind::q_learning::QTable;
///
/// let repo = InMemoryRepository::new();
/// assert!(repo.load(Path::new("agent"))?.is_none());
///
/// repo.save(&QTable::new(), Path::new("agent"))?;
/// assert!(repo.load(Path::new("agent"))?.is_some());
/// # Ok::<(), tilemind::Error>(())
/// ```
///
/// # Thread Safety
///
/// All clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> Result<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.storage.lock().map_err(|_| Error::LockPoisoned {
            resource: "in-memory repository".to_string(),
        })
    }

    /// Number of tables currently stored.
    pub fn count(&self) -> Result<usize> {
        Ok(self.storage()?.len())
    }

    /// Whether a table is stored at `path`.
    pub fn contains(&self, path: &Path) -> Result<bool> {
        Ok(self.storage()?.contains_key(&key(path)))
    }

    /// Store raw bytes at `path`, e.g. to simulate a corrupt file.
    pub fn insert_raw(&self, path: &Path, bytes: Vec<u8>) -> Result<()> {
        self.storage()?.insert(key(path), bytes);
        Ok(())
    }

    /// Clear all stored tables.
    pub fn clear(&self) -> Result<()> {
        self.storage()?.clear();
        Ok(())
    }
}

fn key(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        let bytes = table.to_bytes()?;
        self.storage()?.insert(key(path), bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<Option<QTable>> {
        let storage = self.storage()?;
        storage
            .get(&key(path))
            .map(|bytes| QTable::from_bytes(bytes))
            .transpose()
    }
}
