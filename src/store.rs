//! Persistent mapping store.
//!
//! Owns the in-memory [`MappingTable`] and its on-disk JSON form. Loading
//! fails soft: a missing file yields an empty table and creates the file, a
//! malformed file is logged and reinitialized. Saving is atomic from the
//! caller's perspective: the table is written to a sibling temp file and
//! renamed over the target, so a failed save leaves the previous persisted
//! state intact.
//!
//! The store is the only synchronization point between device workers; keep
//! it owned by the single consumer loop (see
//! [`ModeController`](crate::session::ModeController)) so writes stay
//! serialized.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::binding::{ActionKind, BindingKey, MappingTable};
use crate::error::StoreError;

pub struct MappingStore {
    path: PathBuf,
    table: MappingTable,
}

impl MappingStore {
    /// Loads the table from `path`. Never fails: parse and I/O problems
    /// degrade to an empty table and the file is (re)created.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (table, needs_init) = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<MappingTable>(&text) {
                Ok(table) => {
                    info!("loaded {} binding(s) from {}", table.len(), path.display());
                    (table, false)
                }
                Err(err) => {
                    warn!(
                        "{}: malformed mapping table ({err}); starting empty",
                        path.display()
                    );
                    (MappingTable::new(), true)
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("{}: no mapping file, starting empty", path.display());
                (MappingTable::new(), true)
            }
            Err(err) => {
                warn!("{}: could not read mapping table ({err})", path.display());
                (MappingTable::new(), true)
            }
        };

        let store = Self { path, table };
        if needs_init {
            if let Err(err) = store.save() {
                warn!("{}: could not initialize ({err})", store.path.display());
            }
        }
        store
    }

    /// Serializes the full table, write-to-temp then rename.
    pub fn save(&self) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(&self.table)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn get(&self, key: &BindingKey) -> Option<&ActionKind> {
        self.table.get(key)
    }

    /// Inserts with overwrite semantics and persists the whole table.
    pub fn put(&mut self, key: BindingKey, action: ActionKind) -> Result<(), StoreError> {
        self.table.insert(key, action);
        self.save()
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
