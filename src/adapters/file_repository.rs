//! File-backed table repository.
//!
//! Tables are written in the versioned MessagePack format of
//! [`crate::q_learning::SavedQTable`].

use std::path::Path;

use crate::{Error, Result, ports::TableRepository, q_learning::QTable};

/// Stores each table in its own file.
///
/// Saving goes through a sibling `.tmp` file that is renamed over the
/// target, so a reader sees either the previous table or the new one.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
///
/// use tilemind::adapters::FileRepository;
/// use tilemind::ports::TableRepository;
/// use tilemind::q_learning::QTable;
///
/// let repo = FileRepository::new();
/// repo.save(&QTable::new(), Path::new("trained.qtable"))?;
///
/// match repo.load(Path::new("trained.qtable"))? {
///     Some(table) => println!("{} states", table.len()),
///     None => println!("nothing saved yet"),
/// }
/// # Ok::<(), tilemind::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRepository {
    create_dirs: bool,
}

impl FileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create missing parent directories on save.
    pub fn with_create_dirs(mut self, create_dirs: bool) -> Self {
        self.create_dirs = create_dirs;
        self
    }
}

impl TableRepository for FileRepository {
    fn save(&self, table: &QTable, path: &Path) -> Result<()> {
        if self.create_dirs
            && let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                operation: format!("create directory {}", parent.display()),
                source,
            })?;
        }
        table.save_to_file(path)
    }

    fn load(&self, path: &Path) -> Result<Option<QTable>> {
        QTable::load_from_file(path)
    }
}
