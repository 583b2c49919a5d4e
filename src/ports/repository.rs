//! Repository port for value-table persistence.

use std::path::Path;

use crate::{Result, q_learning::QTable};

/// Port for persisting and loading value tables.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tilemind::{adapters::FileRepository, ports::TableRepository, q_learning::QTable};
///
/// let repo = FileRepository::new();
/// repo.save(&QTable::new(), Path::new("agent.qtable"))?;
/// let loaded = repo.load(Path::new("agent.qtable"))?;
/// assert!(loaded.is_some());
/// # Ok::<(), tilemind::Error>(())
/// ```
pub trait TableRepository: Send + Sync {
    /// Save a table, replacing whatever was stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails or the location cannot be written.
    fn save(&self, table: &QTable, path: &Path) -> Result<()>;

    /// Load the table stored at `path`.
    ///
    /// Returns `Ok(None)` when nothing has been stored there yet.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the stored bytes are not a valid
    /// table, or an I/O error if they cannot be read.
    fn load(&self, path: &Path) -> Result<Option<QTable>>;
}
