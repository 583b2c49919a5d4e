//! Q-table implementation for temporal difference learning

use std::{collections::HashMap, fs, io::ErrorKind, path::Path};

use crate::{
    Error, Result,
    game::Direction,
    q_learning::serialization::SavedQTable,
    types::{ActionValues, StateKey},
};

/// Q-table mapping encoded states to one value per direction.
///
/// Rows are created lazily: the first [`QTable::get_or_init`] or
/// [`QTable::set`] for an unseen state inserts a zero row. Rows are never
/// removed except by [`QTable::clear`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<StateKey, ActionValues>,
}

impl QTable {
    /// Create an empty Q-table
    pub fn new() -> Self {
        Self::default()
    }

    /// Row for `key`, inserting zeros if the state has never been seen.
    pub fn get_or_init(&mut self, key: StateKey) -> ActionValues {
        *self.values.entry(key).or_insert([0.0; Direction::COUNT])
    }

    /// Row for `key` without inserting.
    pub fn get(&self, key: &StateKey) -> Option<&ActionValues> {
        self.values.get(key)
    }

    /// Overwrite one action slot in place.
    pub fn set(&mut self, key: StateKey, action: Direction, value: f64) {
        self.values.entry(key).or_insert([0.0; Direction::COUNT])[action.index()] = value;
    }

    pub fn contains(&self, key: &StateKey) -> bool {
        self.values.contains_key(key)
    }

    /// Get total number of states stored
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.values.iter()
    }

    /// Reset all Q-values (for episodic learning)
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Encode the whole table in the versioned on-disk format.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        SavedQTable::from_table(self).to_bytes()
    }

    /// Decode a table produced by [`QTable::to_bytes`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for corrupt, foreign, or version-mismatched
    /// input. A partially readable blob never yields a partial table.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        SavedQTable::from_bytes(bytes)?.into_table()
    }

    /// Write the table to `path`, replacing any previous file atomically.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let tmp = temp_path(path);

        fs::write(&tmp, &bytes).map_err(|source| Error::Io {
            operation: format!("write {}", tmp.display()),
            source,
        })?;
        fs::rename(&tmp, path).map_err(|source| Error::Io {
            operation: format!("move {} to {}", tmp.display(), path.display()),
            source,
        })?;

        Ok(())
    }

    /// Read a table from `path`; `Ok(None)` if there is no file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes).map(Some),
            Err(source) if source.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::Io {
                operation: format!("read {}", path.display()),
                source,
            }),
        }
    }

    pub(crate) fn from_entries(values: HashMap<StateKey, ActionValues>) -> Self {
        Self { values }
    }
}

fn temp_path(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "qtable".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Largest value in a row.
pub fn max_value(values: &ActionValues) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Direction with the highest value; ties go to the lowest index.
pub fn greedy_direction(values: &ActionValues) -> Direction {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    Direction::ALL[best]
}

/// Greedy choice restricted to `candidates`; `None` if there are none.
pub fn greedy_among(values: &ActionValues, candidates: &[Direction]) -> Option<Direction> {
    let mut best: Option<Direction> = None;
    for &direction in candidates {
        match best {
            Some(current) if values[direction.index()] <= values[current.index()] => {}
            _ => best = Some(direction),
        }
    }
    best
}
