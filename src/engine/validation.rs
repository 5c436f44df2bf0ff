// SPDX-License-Identifier: AGPL-3.0-or-later

//! Validation of entries against the content store.
//!
//! The checks run in a fixed order and return on first failure: signature, payload hash,
//! backlink, lipmaalink, then the certificate pool chain. Validation is read-only on the
//! content store.
//!
//! An absent backlink target is tolerated: under partial replication the immediate predecessor
//! of an entry is often not stored locally. The lipmaa spine is not negotiable, its targets are
//! demanded whenever the stored log claims to reach them.
use crate::entry::{
    decode_entry, encode_preamble, validate_payload, validate_signature, EncodeEntryError, Entry,
    ValidationError,
};
use crate::store::ContentStore;

/// Validates one entry against the clump's content store.
pub(crate) fn validate_entry(
    content: &ContentStore,
    entry: &Entry,
) -> Result<(), ValidationError> {
    validate_against_store(content, entry, true)?;

    // Walk the certificate pool below this entry and re-check every member the stored log
    // claims to contain. Payload hashes are not re-checked here, they concern the member's own
    // payload which was verified when it was stored.
    let author = entry.author().as_str().to_owned();
    let log_id = entry.log_id().as_u64();
    let max_seq_num = content.max_seq_num(&author, log_id);

    for seq_num in entry.seq_num().certificate_pool() {
        if seq_num == entry.seq_num().as_u64() || seq_num > max_seq_num {
            continue;
        }

        let key = (author.clone(), log_id, seq_num);
        let bytes = content
            .get(&key)
            .and_then(|record| record.entry.clone())
            .ok_or(ValidationError::ChainBroken(seq_num))?;

        let (member, _) =
            decode_entry(&bytes).map_err(|_| ValidationError::ChainBroken(seq_num))?;

        validate_against_store(content, &member, false)?;
    }

    Ok(())
}

/// Signature, payload and link checks for one entry, without walking its certificate pool.
fn validate_against_store(
    content: &ContentStore,
    entry: &Entry,
    check_payload: bool,
) -> Result<(), ValidationError> {
    // Recompose the preamble exactly; this also checks the link shape for the sequence number
    let unsigned_bytes = encode_preamble(entry).map_err(|err| match err {
        EncodeEntryError::ValidationError(err) => err,
    })?;

    validate_signature(entry.author(), entry.signature(), &unsigned_bytes)?;

    if check_payload {
        if let Some(payload) = entry.payload() {
            validate_payload(entry, payload)?;
        }
    }

    let author = entry.author().as_str().to_owned();
    let log_id = entry.log_id().as_u64();

    // Backlink: verify against the stored predecessor, tolerate its absence
    if let (Some(backlink), Some(backlink_seq_num)) =
        (entry.backlink(), entry.seq_num().backlink_seq_num())
    {
        let key = (author.clone(), log_id, backlink_seq_num.as_u64());
        if let Some(bytes) = content.get(&key).and_then(|record| record.entry.as_ref()) {
            backlink
                .verify(bytes)
                .map_err(|_| ValidationError::InvalidBacklink)?;
        }
    }

    // Lipmaalink: the certificate pool demands its target
    if let (Some(lipmaalink), Some(lipmaalink_seq_num)) =
        (entry.lipmaalink(), entry.seq_num().lipmaalink_seq_num())
    {
        let key = (author, log_id, lipmaalink_seq_num.as_u64());
        match content.get(&key).and_then(|record| record.entry.as_ref()) {
            Some(bytes) => lipmaalink
                .verify(bytes)
                .map_err(|_| ValidationError::InvalidLipmaa)?,
            None => return Err(ValidationError::MissingLipmaa(lipmaalink_seq_num.as_u64())),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::entry::{encode_entry, Entry, LogId, ValidationError};
    use crate::identity::KeyPair;
    use crate::store::{ContentRecord, ContentStore};
    use crate::test_utils::fixtures::{key_pair, sign_log};

    use super::validate_entry;

    fn store_with(entries: &[Entry]) -> (tempfile::TempDir, ContentStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let mut content = ContentStore::open(&dir.path().join("content.dets")).unwrap();

        for entry in entries {
            let key = (
                entry.author().as_str().to_owned(),
                entry.log_id().as_u64(),
                entry.seq_num().as_u64(),
            );
            let record = ContentRecord {
                entry: Some(encode_entry(entry).unwrap().into_bytes()),
                payload: entry.payload().map(|payload| payload.to_vec()),
            };
            content.put(key, record).unwrap();
        }

        (dir, content)
    }

    #[rstest]
    fn accepts_well_linked_logs(key_pair: KeyPair) {
        let entries = sign_log(&key_pair, &LogId::default(), 14);
        let (_dir, content) = store_with(&entries);

        for entry in &entries {
            assert!(validate_entry(&content, entry).is_ok());
        }
    }

    #[rstest]
    fn tolerates_absent_backlink_target(key_pair: KeyPair) {
        let entries = sign_log(&key_pair, &LogId::default(), 14);

        // Keep only the certificate pool of entry 14: 13, 4 and 1
        let pool: Vec<Entry> = entries
            .iter()
            .filter(|entry| [1, 4, 13].contains(&entry.seq_num().as_u64()))
            .cloned()
            .collect();
        let (_dir, content) = store_with(&pool);

        // Entry 14 backlinks to 13 (stored) and has no own lipmaalink demand; entry 13
        // backlinks to 12 which is absent, its lipmaalink target 4 is stored
        assert!(validate_entry(&content, &entries[13]).is_ok());
        assert!(validate_entry(&content, &entries[12]).is_ok());
    }

    #[rstest]
    fn demands_lipmaa_targets(key_pair: KeyPair) {
        let entries = sign_log(&key_pair, &LogId::default(), 13);

        // Entry 13 demands its lipmaalink target 4
        let partial: Vec<Entry> = entries
            .iter()
            .filter(|entry| ![4].contains(&entry.seq_num().as_u64()))
            .cloned()
            .collect();
        let (_dir, content) = store_with(&partial);

        assert!(matches!(
            validate_entry(&content, &entries[12]).unwrap_err(),
            ValidationError::MissingLipmaa(4)
        ));
    }

    #[rstest]
    fn rejects_tampered_links(key_pair: KeyPair) {
        let entries = sign_log(&key_pair, &LogId::default(), 3);
        let other_entries = sign_log(&KeyPair::new(), &LogId::default(), 3);
        let (_dir, mut content) = store_with(&entries);

        // Swap the stored predecessor for a foreign entry, the backlink no longer matches
        let key = (entries[0].author().as_str().to_owned(), 0, 1);
        content
            .put(
                key,
                ContentRecord {
                    entry: Some(encode_entry(&other_entries[0]).unwrap().into_bytes()),
                    payload: None,
                },
            )
            .unwrap();

        assert!(matches!(
            validate_entry(&content, &entries[1]).unwrap_err(),
            ValidationError::InvalidBacklink
        ));
    }

    #[rstest]
    fn rejects_tampered_payloads(key_pair: KeyPair) {
        let entries = sign_log(&key_pair, &LogId::default(), 1);
        let (_dir, content) = store_with(&entries);

        let mut tampered = entries[0].clone();
        tampered.payload = Some(b"not the signed payload".to_vec());

        assert!(matches!(
            validate_entry(&content, &tampered).unwrap_err(),
            ValidationError::InvalidPayloadHash
        ));
    }
}
