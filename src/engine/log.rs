// SPDX-License-Identifier: AGPL-3.0-or-later

//! Log operations: append, retrieval, compaction and purging.
use std::collections::BTreeSet;

use ::log::{debug, warn};

use crate::engine::validation::validate_entry;
use crate::engine::{Baobab, EngineError, Options};
use crate::entry::{decode_entry, encode_entry, sign_entry, Entry, LogId, SeqNum};
use crate::hash::Hash;
use crate::store::{ContentKey, ContentRecord, ContentStore, KeyPattern, RecordPart};

impl Baobab {
    /// Appends a payload to an identity's log and returns the signed entry.
    ///
    /// The entry is placed at the next free sequence number of `(author, log_id)` in the
    /// addressed clump, linked to its predecessor and its lipmaa target, signed and persisted
    /// with both halves. Appends to the same log are serialized by the clump's content store
    /// lock, concurrent appends can not collide on a sequence number.
    pub fn append(
        &self,
        payload: &[u8],
        alias: &str,
        options: &Options,
    ) -> Result<Entry, EngineError> {
        let key_pair = self.identities.lock().unwrap().key_pair(alias)?;
        let author = key_pair.author();
        let clump = self.clump(&options.clump_id)?;

        let mut content = clump.content.lock().unwrap();

        let prev_seq_num = content.max_seq_num(author.as_str(), options.log_id);
        // Unwrap as the successor of any stored sequence number is positive
        let seq_num = SeqNum::new(prev_seq_num + 1).unwrap();

        let backlink = match prev_seq_num {
            0 => None,
            _ => Some(stored_entry_hash(
                &content,
                &(author.as_str().to_owned(), options.log_id, prev_seq_num),
            )?),
        };

        let lipmaalink = match seq_num.lipmaalink_seq_num() {
            Some(target) => Some(stored_entry_hash(
                &content,
                &(author.as_str().to_owned(), options.log_id, target.as_u64()),
            )?),
            None => None,
        };

        let entry = sign_entry(
            &LogId::new(options.log_id),
            &seq_num,
            lipmaalink.as_ref(),
            backlink.as_ref(),
            payload,
            &key_pair,
        )?;

        let encoded = encode_entry(&entry)?;
        debug!(
            "Appending entry {} to log {} of {}",
            seq_num, options.log_id, author
        );

        content.put(
            (author.as_str().to_owned(), options.log_id, seq_num.as_u64()),
            ContentRecord {
                entry: Some(encoded.into_bytes()),
                payload: Some(payload.to_vec()),
            },
        )?;

        drop(content);
        self.invalidate_content_digest(&clump)?;

        Ok(entry)
    }

    /// Retrieves a single entry, `None` as sequence number addresses the current maximum.
    ///
    /// With `options.revalidate` the entry is run through full validation before it is
    /// returned.
    pub fn log_entry(
        &self,
        author: &str,
        seq_num: Option<u64>,
        options: &Options,
    ) -> Result<Entry, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let mut content = clump.content.lock().unwrap();

        let seq_num = match seq_num {
            Some(seq_num) => seq_num,
            None => content.max_seq_num(author.as_str(), options.log_id),
        };

        let key = (author.as_str().to_owned(), options.log_id, seq_num);
        let entry = fetch_entry(&mut content, &key)?.ok_or(EngineError::Missing)?;

        if options.revalidate {
            validate_entry(&content, &entry)?;
        }

        Ok(entry)
    }

    /// Retrieves a single entry in its binary transport form, `entry ‖ payload`.
    ///
    /// The bytes are returned exactly as stored.
    pub fn log_entry_binary(
        &self,
        author: &str,
        seq_num: Option<u64>,
        options: &Options,
    ) -> Result<Vec<u8>, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let mut content = clump.content.lock().unwrap();

        let seq_num = match seq_num {
            Some(seq_num) => seq_num,
            None => content.max_seq_num(author.as_str(), options.log_id),
        };

        let key = (author.as_str().to_owned(), options.log_id, seq_num);

        // Decode before answering so corrupt records heal instead of spreading
        fetch_entry(&mut content, &key)?.ok_or(EngineError::Missing)?;

        // Unwrap as the record was just fetched successfully
        let record = content.get(&key).unwrap();
        let mut bytes = record.entry.clone().unwrap();
        if let Some(payload) = &record.payload {
            bytes.extend_from_slice(payload);
        }

        Ok(bytes)
    }

    /// Returns the certificate pool path of an entry, ascending from the first entry.
    ///
    /// The path contains every stored pool member between 1 and the addressed sequence number
    /// (`None` for the current maximum); absent members are skipped.
    pub fn log_at(
        &self,
        author: &str,
        seq_num: Option<u64>,
        options: &Options,
    ) -> Result<Vec<Entry>, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let mut content = clump.content.lock().unwrap();

        let max_seq_num = content.max_seq_num(author.as_str(), options.log_id);
        let seq_num = seq_num.unwrap_or(max_seq_num);
        if seq_num == 0 {
            return Ok(Vec::new());
        }

        // Unwrap as zero was just ruled out
        let mut pool = SeqNum::new(seq_num).unwrap().certificate_pool();
        pool.reverse();

        let mut entries = Vec::new();
        for seq_num in pool {
            if seq_num > max_seq_num {
                continue;
            }

            let key = (author.as_str().to_owned(), options.log_id, seq_num);
            if let Some(entry) = fetch_entry(&mut content, &key)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Returns every stored entry with a sequence number in `[first, last]`, ascending.
    ///
    /// Ranges start at 2: the first entry of a log has no link into a range before it.
    pub fn log_range(
        &self,
        author: &str,
        range: (u64, u64),
        options: &Options,
    ) -> Result<Vec<Entry>, EngineError> {
        let (first, last) = range;
        if first < 2 || last < first {
            return Err(EngineError::BadRange);
        }

        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let mut content = clump.content.lock().unwrap();

        let mut entries = Vec::new();
        for seq_num in content.all_seq_nums(author.as_str(), options.log_id) {
            if seq_num < first || seq_num > last {
                continue;
            }

            let key = (author.as_str().to_owned(), options.log_id, seq_num);
            if let Some(entry) = fetch_entry(&mut content, &key)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Returns every stored entry of the log, ascending.
    pub fn full_log(&self, author: &str, options: &Options) -> Result<Vec<Entry>, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let mut content = clump.content.lock().unwrap();

        let mut entries = Vec::new();
        for seq_num in content.all_seq_nums(author.as_str(), options.log_id) {
            let key = (author.as_str().to_owned(), options.log_id, seq_num);
            if let Some(entry) = fetch_entry(&mut content, &key)? {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Largest sequence number of `(author, log_id)` in the clump, 0 when nothing is stored.
    pub fn max_seq_num(&self, author: &str, options: &Options) -> Result<u64, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let content = clump.content.lock().unwrap();
        Ok(content.max_seq_num(author.as_str(), options.log_id))
    }

    /// All stored sequence numbers of `(author, log_id)`, ascending.
    pub fn all_seq_nums(&self, author: &str, options: &Options) -> Result<Vec<u64>, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let content = clump.content.lock().unwrap();
        Ok(content.all_seq_nums(author.as_str(), options.log_id))
    }

    /// The certificate pool of a sequence number as far as the store holds it, descending.
    ///
    /// Only members within the stored maximum and actually present are returned.
    pub fn certificate_pool(
        &self,
        author: &str,
        seq_num: u64,
        options: &Options,
    ) -> Result<Vec<u64>, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let content = clump.content.lock().unwrap();

        if seq_num == 0 {
            return Ok(Vec::new());
        }

        let max_seq_num = content.max_seq_num(author.as_str(), options.log_id);

        // Unwrap as zero was just ruled out
        let pool = SeqNum::new(seq_num)
            .unwrap()
            .certificate_pool()
            .into_iter()
            .filter(|seq_num| {
                *seq_num <= max_seq_num
                    && content.exists_part(
                        &(author.as_str().to_owned(), options.log_id, *seq_num),
                        RecordPart::Entry,
                    )
            })
            .collect();

        Ok(pool)
    }

    /// Reduces a log to the entries certifying its tip.
    ///
    /// Everything outside the certificate pool of the largest stored sequence number is
    /// deleted. Returns the deleted sequence numbers, ascending; running compaction again on a
    /// compacted log deletes nothing.
    pub fn compact(&self, author: &str, options: &Options) -> Result<Vec<u64>, EngineError> {
        let author = self.resolve_author(author)?;
        let clump = self.clump(&options.clump_id)?;
        let mut content = clump.content.lock().unwrap();

        let seq_nums = content.all_seq_nums(author.as_str(), options.log_id);
        let tip = match seq_nums.last() {
            Some(tip) => *tip,
            None => return Ok(Vec::new()),
        };

        // Unwrap as stored sequence numbers are positive
        let keep: BTreeSet<u64> = SeqNum::new(tip)
            .unwrap()
            .certificate_pool()
            .into_iter()
            .collect();

        let mut deleted = Vec::new();
        for seq_num in seq_nums {
            if keep.contains(&seq_num) {
                continue;
            }

            content.delete(&(author.as_str().to_owned(), options.log_id, seq_num))?;
            deleted.push(seq_num);
        }

        if !deleted.is_empty() {
            debug!(
                "Compacted log {} of {}, deleted {} entries",
                options.log_id,
                author,
                deleted.len()
            );
            drop(content);
            self.invalidate_content_digest(&clump)?;
        }

        Ok(deleted)
    }

    /// Removes stored content by scope and returns the remaining stored info of the clump.
    ///
    /// `None` stands for "all": both arguments `None` truncates the whole content table, an
    /// author alone removes all their logs, a log id alone removes that log of every author,
    /// both remove exactly one log.
    pub fn purge(
        &self,
        author: Option<&str>,
        log_id: Option<u64>,
        clump_id: &str,
    ) -> Result<Vec<(String, u64, u64)>, EngineError> {
        let author = match author {
            Some(reference) => Some(self.resolve_author(reference)?),
            None => None,
        };

        let clump = self.clump(clump_id)?;
        let mut content = clump.content.lock().unwrap();

        match (&author, log_id) {
            (None, None) => content.truncate()?,
            (None, Some(log_id)) => {
                content.match_delete(&KeyPattern::any().log_id(log_id))?;
            }
            (Some(author), None) => {
                content.match_delete(&KeyPattern::any().author(author.as_str()))?;
            }
            (Some(author), Some(log_id)) => {
                content.match_delete(&KeyPattern::any().author(author.as_str()).log_id(log_id))?;
            }
        }

        debug!("Purged content in clump {}", clump_id);
        let info = content.stored_info();

        drop(content);
        self.invalidate_content_digest(&clump)?;

        Ok(info)
    }

    /// One `(author, log_id, max_seqnum)` triple per log stored in the clump, sorted.
    pub fn stored_info(&self, clump_id: &str) -> Result<Vec<(String, u64, u64)>, EngineError> {
        let clump = self.clump(clump_id)?;
        let content = clump.content.lock().unwrap();
        Ok(content.stored_info())
    }

    /// Every content key stored in the clump, sorted.
    pub fn all_entries(&self, clump_id: &str) -> Result<Vec<ContentKey>, EngineError> {
        let clump = self.clump(clump_id)?;
        let content = clump.content.lock().unwrap();
        Ok(content.keys())
    }

    /// Persists a foreign entry after running it through block checks and validation.
    ///
    /// An existing record under the entry's key is returned unchanged unless `options.replace`
    /// is set.
    pub fn store_entry(&self, entry: &Entry, options: &Options) -> Result<Entry, EngineError> {
        let clump = self.clump(&options.clump_id)?;

        let author = entry.author().clone();
        let log_id = entry.log_id().as_u64();

        {
            let metadata = clump.metadata.lock().unwrap();
            if metadata.is_blocked(author.as_str(), log_id) {
                return Err(EngineError::RefusedBlocked);
            }
        }

        let mut content = clump.content.lock().unwrap();
        let key = (author.as_str().to_owned(), log_id, entry.seq_num().as_u64());

        if !options.replace && content.exists_part(&key, RecordPart::Entry) {
            if let Some(existing) = fetch_entry(&mut content, &key)? {
                return Ok(existing);
            }
        }

        validate_entry(&content, entry)?;

        let encoded = encode_entry(entry)?;
        debug!(
            "Storing entry {} of log {} of {}",
            entry.seq_num(),
            log_id,
            author
        );

        // A payload half already at hand survives storing an entry which travelled without one
        let payload = match entry.payload() {
            Some(payload) => Some(payload.to_vec()),
            None => content.get(&key).and_then(|record| record.payload.clone()),
        };

        content.put(
            key,
            ContentRecord {
                entry: Some(encoded.into_bytes()),
                payload,
            },
        )?;

        drop(content);
        self.invalidate_content_digest(&clump)?;

        Ok(entry.clone())
    }
}

/// Hash of the stored entry bytes under `key`, the input to back- and lipmaalinks.
fn stored_entry_hash(content: &ContentStore, key: &ContentKey) -> Result<Hash, EngineError> {
    let bytes = content
        .get(key)
        .and_then(|record| record.entry.as_ref())
        .ok_or(EngineError::Missing)?;

    // Unwrap as hashing bytes can not fail
    Ok(Hash::new_from_bytes(bytes).unwrap())
}

/// Retrieves and decodes the entry stored under `key`, attaching its payload half.
///
/// A record whose entry bytes fail to decode is deleted and reported absent: local corruption
/// heals instead of wedging retrieval. The deletion is idempotent and never touches well-formed
/// records.
fn fetch_entry(
    content: &mut ContentStore,
    key: &ContentKey,
) -> Result<Option<Entry>, EngineError> {
    let record = match content.get(key) {
        Some(record) => record.clone(),
        None => return Ok(None),
    };

    let bytes = match &record.entry {
        Some(bytes) => bytes,
        None => return Ok(None),
    };

    match decode_entry(bytes) {
        Ok((mut entry, _)) => {
            entry.payload = record.payload.clone();
            Ok(Some(entry))
        }
        Err(err) => {
            warn!(
                "Deleting undecodable entry record {}/{}/{}: {}",
                key.0, key.1, key.2, err
            );
            content.delete(key)?;
            Ok(None)
        }
    }
}
