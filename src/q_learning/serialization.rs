//! Versioned on-disk format for value tables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    q_learning::q_table::QTable,
    types::{ActionValues, StateKey},
};

/// Identifier written at the start of every saved table.
pub const FORMAT_ID: &str = "tilemind.qtable";

/// Serializable representation of a value table
///
/// Entries are sorted by key so equal tables encode to equal bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedQTable {
    /// Format identifier, always [`FORMAT_ID`]
    pub format: String,
    /// Version of the save format
    pub version: u32,
    entries: Vec<(StateKey, ActionValues)>,
}

impl SavedQTable {
    /// Current save format version
    pub const VERSION: u32 = 1;

    pub fn from_table(table: &QTable) -> Self {
        let mut entries: Vec<(StateKey, ActionValues)> =
            table.iter().map(|(key, values)| (*key, *values)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Self {
            format: FORMAT_ID.to_string(),
            version: Self::VERSION,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate the header and contents and build the table.
    pub fn into_table(self) -> Result<QTable> {
        if self.format != FORMAT_ID {
            return Err(Error::Decode {
                reason: format!(
                    "unknown format identifier '{}' (expected '{FORMAT_ID}')",
                    self.format
                ),
            });
        }
        if self.version != Self::VERSION {
            return Err(Error::Decode {
                reason: format!(
                    "unsupported format version {} (expected {})",
                    self.version,
                    Self::VERSION
                ),
            });
        }

        let mut values = HashMap::with_capacity(self.entries.len());
        for (key, row) in self.entries {
            if row.iter().any(|v| !v.is_finite()) {
                return Err(Error::Decode {
                    reason: format!("non-finite action value for state {key}"),
                });
            }
            if key.to_board().is_err() {
                return Err(Error::Decode {
                    reason: format!("state {key} is not a valid board"),
                });
            }
            if values.insert(key, row).is_some() {
                return Err(Error::Decode {
                    reason: format!("duplicate state {key}"),
                });
            }
        }

        Ok(QTable::from_entries(values))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec(self).map_err(|e| Error::Encode {
            message: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::Decode {
            reason: e.to_string(),
        })
    }
}
