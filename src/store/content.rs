// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::store::keyed_file::KeyedFile;
use crate::store::StoreError;

/// Key of a content record: author (base62), log id and sequence number.
pub type ContentKey = (String, u64, u64);

/// Both halves of a stored entry.
///
/// A record may carry the entry bytes but not the payload (common after a preamble-only
/// exchange) or the other way around. A record with both halves absent counts as not stored.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ContentRecord {
    /// Signed entry bytes without the payload.
    #[serde(with = "serde_bytes")]
    pub entry: Option<Vec<u8>>,

    /// Payload bytes.
    #[serde(with = "serde_bytes")]
    pub payload: Option<Vec<u8>>,
}

/// Addressable halves of a content record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordPart {
    /// The signed entry bytes.
    Entry,

    /// The payload bytes.
    Payload,
}

/// Pattern over content keys, matching on any subset of author, log id and sequence number.
#[derive(Clone, Debug, Default)]
pub struct KeyPattern {
    author: Option<String>,
    log_id: Option<u64>,
    seq_num: Option<u64>,
}

impl KeyPattern {
    /// Returns a pattern matching every key.
    pub fn any() -> Self {
        Self::default()
    }

    /// Restricts the pattern to one author.
    pub fn author(mut self, author: &str) -> Self {
        self.author = Some(author.to_owned());
        self
    }

    /// Restricts the pattern to one log id.
    pub fn log_id(mut self, log_id: u64) -> Self {
        self.log_id = Some(log_id);
        self
    }

    /// Restricts the pattern to one sequence number.
    pub fn seq_num(mut self, seq_num: u64) -> Self {
        self.seq_num = Some(seq_num);
        self
    }

    fn matches(&self, key: &ContentKey) -> bool {
        self.author.as_ref().map_or(true, |author| *author == key.0)
            && self.log_id.map_or(true, |log_id| log_id == key.1)
            && self.seq_num.map_or(true, |seq_num| seq_num == key.2)
    }
}

/// Per-clump persistence of entries and payloads.
///
/// The mapping `(author, log_id, seqnum) → {entry, payload}` with pattern deletion, folds and
/// cheap membership probes. One instance owns one `content.dets` table file.
#[derive(Debug)]
pub struct ContentStore {
    table: KeyedFile<ContentKey, ContentRecord>,
}

impl ContentStore {
    /// Opens the content table at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            table: KeyedFile::open(path)?,
        })
    }

    /// Returns the full record stored under `key` when present.
    pub fn get(&self, key: &ContentKey) -> Option<&ContentRecord> {
        self.table.get(key)
    }

    /// Inserts or replaces the record under `key`.
    pub fn put(&mut self, key: ContentKey, record: ContentRecord) -> Result<(), StoreError> {
        self.table.insert(key, record)
    }

    /// Removes the record under `key`. Idempotent.
    pub fn delete(&mut self, key: &ContentKey) -> Result<(), StoreError> {
        self.table.remove(key)?;
        Ok(())
    }

    /// Removes every record whose key matches `pattern`, returns how many were dropped.
    pub fn match_delete(&mut self, pattern: &KeyPattern) -> Result<usize, StoreError> {
        self.table.retain(|key, _| !pattern.matches(key))
    }

    /// Yields the keys matching `pattern` in sorted order.
    pub fn matches(&self, pattern: &KeyPattern) -> Vec<ContentKey> {
        self.table
            .iter()
            .filter(|(key, _)| pattern.matches(key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Folds every stored pair once. Iteration order is unspecified.
    pub fn foldl<A, F>(&self, f: F, acc: A) -> A
    where
        F: FnMut(A, (&ContentKey, &ContentRecord)) -> A,
    {
        let mut f = f;
        let mut acc = acc;
        for pair in self.table.iter() {
            acc = f(acc, pair);
        }
        acc
    }

    /// Removes all records.
    pub fn truncate(&mut self) -> Result<(), StoreError> {
        self.table.clear()
    }

    /// Cheap membership test for one half of a record.
    pub fn exists_part(&self, key: &ContentKey, part: RecordPart) -> bool {
        match (self.table.get(key), part) {
            (Some(record), RecordPart::Entry) => record.entry.is_some(),
            (Some(record), RecordPart::Payload) => record.payload.is_some(),
            (None, _) => false,
        }
    }

    /// Largest sequence number stored for `(author, log_id)`, 0 when the log is empty.
    pub fn max_seq_num(&self, author: &str, log_id: u64) -> u64 {
        self.all_seq_nums(author, log_id).last().copied().unwrap_or(0)
    }

    /// All sequence numbers stored for `(author, log_id)`, ascending.
    pub fn all_seq_nums(&self, author: &str, log_id: u64) -> Vec<u64> {
        self.table
            .iter()
            .filter(|((key_author, key_log_id, _), _)| {
                key_author == author && *key_log_id == log_id
            })
            .map(|((_, _, seq_num), _)| *seq_num)
            .collect()
    }

    /// One `(author, log_id, max_seqnum)` triple per stored log, sorted.
    pub fn stored_info(&self) -> Vec<(String, u64, u64)> {
        let mut info: Vec<(String, u64, u64)> = Vec::new();

        for ((author, log_id, seq_num), _) in self.table.iter() {
            match info.last_mut() {
                Some((last_author, last_log_id, max_seq_num))
                    if last_author == author && last_log_id == log_id =>
                {
                    *max_seq_num = (*max_seq_num).max(*seq_num);
                }
                _ => info.push((author.clone(), *log_id, *seq_num)),
            }
        }

        info
    }

    /// Distinct authors with stored content, sorted.
    pub fn authors(&self) -> Vec<String> {
        let mut authors: Vec<String> = self
            .table
            .iter()
            .map(|((author, _, _), _)| author.clone())
            .collect();
        authors.dedup();
        authors
    }

    /// Every stored key, sorted.
    pub fn keys(&self) -> Vec<ContentKey> {
        self.table.iter().map(|(key, _)| key.clone()).collect()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns true when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Deterministic byte representation of the whole table, input to the status digest.
    pub fn digest_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        for ((author, log_id, seq_num), record) in self.table.iter() {
            bytes.extend_from_slice(author.as_bytes());
            bytes.extend_from_slice(&log_id.to_be_bytes());
            bytes.extend_from_slice(&seq_num.to_be_bytes());

            for half in [&record.entry, &record.payload].iter() {
                match half {
                    Some(content) => {
                        bytes.extend_from_slice(&(content.len() as u64).to_be_bytes());
                        bytes.extend_from_slice(content);
                    }
                    None => bytes.extend_from_slice(&u64::MAX.to_be_bytes()),
                }
            }
        }

        bytes
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{ContentRecord, ContentStore, KeyPattern, RecordPart};

    fn store() -> (TempDir, ContentStore) {
        let dir = TempDir::new().unwrap();
        let store = ContentStore::open(&dir.path().join("content.dets")).unwrap();
        (dir, store)
    }

    fn record(entry: &[u8]) -> ContentRecord {
        ContentRecord {
            entry: Some(entry.to_vec()),
            payload: None,
        }
    }

    #[test]
    fn keyed_crud() {
        let (_dir, mut store) = store();
        let key = ("author".to_string(), 0, 1);

        assert!(store.get(&key).is_none());
        store.put(key.clone(), record(b"entry")).unwrap();
        assert_eq!(store.get(&key).unwrap().entry.as_deref(), Some(&b"entry"[..]));

        assert!(store.exists_part(&key, RecordPart::Entry));
        assert!(!store.exists_part(&key, RecordPart::Payload));

        store.delete(&key).unwrap();
        store.delete(&key).unwrap();
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn pattern_matching() {
        let (_dir, mut store) = store();

        for (author, log_id, seq_num) in [("a", 0, 1), ("a", 0, 2), ("a", 1, 1), ("b", 0, 1)].iter()
        {
            store
                .put((author.to_string(), *log_id, *seq_num), record(b"x"))
                .unwrap();
        }

        assert_eq!(store.matches(&KeyPattern::any()).len(), 4);
        assert_eq!(store.matches(&KeyPattern::any().author("a")).len(), 3);
        assert_eq!(store.matches(&KeyPattern::any().author("a").log_id(0)).len(), 2);
        assert_eq!(store.matches(&KeyPattern::any().log_id(0)).len(), 3);

        assert_eq!(store.match_delete(&KeyPattern::any().author("a")).unwrap(), 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn log_queries() {
        let (_dir, mut store) = store();

        for seq_num in [1, 2, 5, 9].iter() {
            store
                .put(("a".to_string(), 0, *seq_num), record(b"x"))
                .unwrap();
        }
        store.put(("b".to_string(), 3, 7), record(b"x")).unwrap();

        assert_eq!(store.max_seq_num("a", 0), 9);
        assert_eq!(store.max_seq_num("a", 1), 0);
        assert_eq!(store.all_seq_nums("a", 0), vec![1, 2, 5, 9]);
        assert_eq!(
            store.stored_info(),
            vec![("a".to_string(), 0, 9), ("b".to_string(), 3, 7)]
        );
        assert_eq!(store.authors(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn digest_bytes_reflect_contents() {
        let (_dir, mut store) = store();
        let empty = store.digest_bytes();

        store.put(("a".to_string(), 0, 1), record(b"x")).unwrap();
        let one = store.digest_bytes();
        assert_ne!(empty, one);

        store.truncate().unwrap();
        assert_eq!(store.digest_bytes(), empty);
    }
}
