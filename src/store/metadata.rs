// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::keyed_file::KeyedFile;
use crate::store::StoreError;

/// One member of a clump's block set.
///
/// Content is refused when its author, its log id or the exact `(author, log_id)` pair is a
/// member of the set. The three shapes are independent: removing an author block does not
/// remove a more specific pair block.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockSpec {
    /// Blocks everything the author wrote.
    Author(String),

    /// Blocks every author's log with this id.
    LogId(u64),

    /// Blocks exactly one author's log.
    AuthorLog(String, u64),
}

impl Display for BlockSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockSpec::Author(author) => write!(f, "{}", author),
            BlockSpec::LogId(log_id) => write!(f, "{}", log_id),
            BlockSpec::AuthorLog(author, log_id) => write!(f, "{}/{}", author, log_id),
        }
    }
}

/// Per-clump block set, persisted in the clump's `metadata.dets` table.
#[derive(Debug)]
pub struct MetadataStore {
    table: KeyedFile<BlockSpec, bool>,
}

impl MetadataStore {
    /// Opens the metadata table at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            table: KeyedFile::open(path)?,
        })
    }

    /// Adds a specifier to the block set. Idempotent; returns true when it was newly added.
    pub fn insert(&mut self, spec: BlockSpec) -> Result<bool, StoreError> {
        if self.table.contains_key(&spec) {
            return Ok(false);
        }

        self.table.insert(spec, true)?;
        Ok(true)
    }

    /// Removes a specifier from the block set, returns true when it was present.
    pub fn remove(&mut self, spec: &BlockSpec) -> Result<bool, StoreError> {
        self.table.remove(spec)
    }

    /// Returns true when exactly this specifier is a member of the set.
    pub fn contains(&self, spec: &BlockSpec) -> bool {
        self.table.contains_key(spec)
    }

    /// Returns true when the triple is covered by any member of the set.
    pub fn is_blocked(&self, author: &str, log_id: u64) -> bool {
        self.contains(&BlockSpec::Author(author.to_owned()))
            || self.contains(&BlockSpec::LogId(log_id))
            || self.contains(&BlockSpec::AuthorLog(author.to_owned(), log_id))
    }

    /// The full block set, sorted.
    pub fn list(&self) -> Vec<BlockSpec> {
        self.table.iter().map(|(spec, _)| spec.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{BlockSpec, MetadataStore};

    #[test]
    fn set_semantics() {
        let dir = TempDir::new().unwrap();
        let mut store = MetadataStore::open(&dir.path().join("metadata.dets")).unwrap();

        let spec = BlockSpec::Author("someone".to_string());
        assert!(store.insert(spec.clone()).unwrap());
        assert!(!store.insert(spec.clone()).unwrap());
        assert!(store.contains(&spec));

        assert!(store.remove(&spec).unwrap());
        assert!(!store.remove(&spec).unwrap());
    }

    #[test]
    fn triple_coverage() {
        let dir = TempDir::new().unwrap();
        let mut store = MetadataStore::open(&dir.path().join("metadata.dets")).unwrap();

        store.insert(BlockSpec::Author("dude".to_string())).unwrap();
        store.insert(BlockSpec::LogId(3)).unwrap();
        store
            .insert(BlockSpec::AuthorLog("guy".to_string(), 2))
            .unwrap();

        assert!(store.is_blocked("dude", 0));
        assert!(store.is_blocked("guy", 3));
        assert!(store.is_blocked("guy", 2));
        assert!(!store.is_blocked("guy", 0));

        // Removing the broad author block leaves the narrow pair block in place
        store.remove(&BlockSpec::Author("dude".to_string())).unwrap();
        assert!(!store.is_blocked("dude", 0));
        assert!(store.is_blocked("guy", 2));
    }
}
