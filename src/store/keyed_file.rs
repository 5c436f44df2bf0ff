// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::StoreError;

/// A keyed table persisted as one CBOR file.
///
/// The full table is held in memory and rewritten on every mutation: serialize into a sibling
/// `.tmp` file, fsync, then rename over the table file. Crashing between any two steps leaves
/// either the previous or the new table on disk.
#[derive(Debug)]
pub(crate) struct KeyedFile<K, V> {
    path: PathBuf,
    table: BTreeMap<K, V>,
}

impl<K, V> KeyedFile<K, V>
where
    K: Ord + Clone + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Opens the table at `path`, loading its contents when the file exists.
    ///
    /// An absent file is written out empty right away: table files mark their store (and their
    /// clump) as existing from the moment it is opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            let file = File::open(path)?;
            let table = ciborium::de::from_reader(BufReader::new(file))
                .map_err(|_| StoreError::Corrupt(path.display().to_string()))?;

            Ok(Self {
                path: path.to_owned(),
                table,
            })
        } else {
            let keyed_file = Self {
                path: path.to_owned(),
                table: BTreeMap::new(),
            };
            keyed_file.persist()?;
            Ok(keyed_file)
        }
    }

    /// Rewrites the table file through a temporary sibling and an atomic rename.
    fn persist(&self) -> Result<(), StoreError> {
        let tmp_path = self.path.with_extension("tmp");

        {
            let mut file = File::create(&tmp_path)?;
            ciborium::ser::into_writer(&self.table, &mut file)
                .map_err(|err| StoreError::Encode(err.to_string()))?;
            file.sync_all()?;
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    pub fn insert(&mut self, key: K, value: V) -> Result<(), StoreError> {
        self.table.insert(key, value);
        self.persist()
    }

    /// Removes `key`, reporting whether it was present. Removing an absent key does not touch
    /// the file.
    pub fn remove(&mut self, key: &K) -> Result<bool, StoreError> {
        match self.table.remove(key) {
            Some(_) => {
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Keeps only pairs the predicate accepts, returns how many were dropped.
    pub fn retain<F>(&mut self, mut predicate: F) -> Result<usize, StoreError>
    where
        F: FnMut(&K, &V) -> bool,
    {
        let before = self.table.len();
        self.table.retain(|key, value| predicate(key, value));
        let removed = before - self.table.len();

        if removed > 0 {
            self.persist()?;
        }

        Ok(removed)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.table.clear();
        self.persist()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
