// SPDX-License-Identifier: AGPL-3.0-or-later

//! Methods to decode entries from their binary form.
//!
//! ```text
//!           ┌─────────────┐                        ┌─────┐
//! bytes ──► │decode_entry │ ──────────────────────►│Entry│ + remaining bytes
//!           └─────────────┘                        └─────┘
//! ```
//!
//! Decoding applies only structural checks; no cryptographic validation takes place here. Use
//! the validator to verify signatures, payload hashes and log integrity.
use std::convert::TryFrom;

use crate::entry::{
    DecodeEntryError, DecodeStreamError, Entry, LogId, SeqNum, Signature, ENTRY_TAG,
    MIN_ENTRY_SIZE, SIGNATURE_SIZE,
};
use crate::hash::{Hash, HashError};
use crate::identity::Author;

/// Reads one varu64 value from the front of `bytes`.
fn decode_varu64(bytes: &[u8]) -> Result<(u64, &[u8]), DecodeEntryError> {
    match varu64::decode(bytes) {
        Ok((value, remainder)) => Ok((value, remainder)),
        Err(_) if bytes.is_empty() => Err(DecodeEntryError::Truncated),
        Err((err, _)) => Err(DecodeEntryError::BadBinary(format!(
            "invalid varu64 value: {:?}",
            err
        ))),
    }
}

/// Reads one yamf hash from the front of `bytes`.
fn decode_hash(bytes: &[u8]) -> Result<(Hash, &[u8]), DecodeEntryError> {
    Hash::decode(bytes).map_err(|err| match err {
        HashError::InvalidLength(..) => DecodeEntryError::Truncated,
        _ => DecodeEntryError::BadBinary("invalid yamf hash".into()),
    })
}

/// Decodes one entry from the front of `bytes` and returns it together with the bytes which
/// were not consumed.
///
/// Whether the two optional links are read is decided from the sequence number, not from the
/// bytes at hand. When exactly the signature ends the binary the payload is marked absent (it
/// may be transported separately); trailing bytes are otherwise consumed as the payload.
pub fn decode_entry(bytes: &[u8]) -> Result<(Entry, &[u8]), DecodeEntryError> {
    if bytes.len() < MIN_ENTRY_SIZE {
        return Err(DecodeEntryError::Truncated);
    }

    if bytes[0] != ENTRY_TAG {
        return Err(DecodeEntryError::BadBinary(format!(
            "unsupported tag byte {:#04x}",
            bytes[0]
        )));
    }

    let author = Author::from_bytes(&bytes[1..MIN_ENTRY_SIZE])
        .map_err(|err| DecodeEntryError::BadBinary(err.to_string()))?;

    let remainder = &bytes[MIN_ENTRY_SIZE..];
    let (log_id, remainder) = decode_varu64(remainder)?;
    let (seq_num, remainder) = decode_varu64(remainder)?;

    let seq_num =
        SeqNum::new(seq_num).map_err(|err| DecodeEntryError::BadBinary(err.to_string()))?;

    let (lipmaalink, remainder) = if seq_num.is_lipmaalink_required() {
        let (hash, rest) = decode_hash(remainder)?;
        (Some(hash), rest)
    } else {
        (None, remainder)
    };

    let (backlink, remainder) = if !seq_num.is_first() {
        let (hash, rest) = decode_hash(remainder)?;
        (Some(hash), rest)
    } else {
        (None, remainder)
    };

    let (payload_size, remainder) = decode_varu64(remainder)?;
    let (payload_hash, remainder) = decode_hash(remainder)?;

    if remainder.len() < SIGNATURE_SIZE {
        return Err(DecodeEntryError::Truncated);
    }

    let (signature_bytes, remainder) = remainder.split_at(SIGNATURE_SIZE);
    // Unwrap as the slice is exactly signature sized
    let signature = Signature::try_from(signature_bytes).unwrap();

    let (payload, remainder) = if remainder.is_empty() {
        (None, remainder)
    } else if remainder.len() as u64 >= payload_size {
        let (payload, rest) = remainder.split_at(payload_size as usize);
        (Some(payload.to_vec()), rest)
    } else {
        return Err(DecodeEntryError::Truncated);
    };

    let entry = Entry {
        author,
        log_id: LogId::new(log_id),
        seq_num,
        lipmaalink,
        backlink,
        payload_size,
        payload_hash,
        signature,
        payload,
    };

    Ok((entry, remainder))
}

/// Decodes a concatenation of entries, as laid out in interchange log files.
///
/// Decoding stops at the first partial or malformed record; the error carries all entries
/// decoded up to that point.
pub fn decode_stream(bytes: &[u8]) -> Result<Vec<Entry>, DecodeStreamError> {
    let mut entries = Vec::new();
    let mut remainder = bytes;

    while !remainder.is_empty() {
        match decode_entry(remainder) {
            Ok((entry, rest)) => {
                entries.push(entry);
                remainder = rest;
            }
            Err(source) => return Err(DecodeStreamError { entries, source }),
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::entry::{encode_full, DecodeEntryError, LogId};
    use crate::identity::KeyPair;
    use crate::test_utils::fixtures::{key_pair, sign_log};

    use super::{decode_entry, decode_stream};

    #[rstest]
    fn author_only_binary_is_truncated(key_pair: KeyPair) {
        let mut bytes = vec![0u8];
        bytes.extend_from_slice(&key_pair.public_key().to_bytes());
        assert!(matches!(
            decode_entry(&bytes).unwrap_err(),
            DecodeEntryError::Truncated
        ));
    }

    #[test]
    fn empty_binary_is_truncated() {
        assert!(matches!(
            decode_entry(&[]).unwrap_err(),
            DecodeEntryError::Truncated
        ));
    }

    #[rstest]
    fn unsupported_tag(key_pair: KeyPair) {
        let entry = &sign_log(&key_pair, &LogId::default(), 1)[0];
        let mut bytes = encode_full(entry).unwrap();
        bytes[0] = 0x07;

        assert!(matches!(
            decode_entry(&bytes).unwrap_err(),
            DecodeEntryError::BadBinary(_)
        ));
    }

    #[rstest]
    fn payload_may_be_absent(key_pair: KeyPair) {
        let entry = &sign_log(&key_pair, &LogId::default(), 1)[0];
        let bytes = encode_full(entry).unwrap();

        let sans_payload = &bytes[..bytes.len() - entry.payload_size() as usize];
        let (decoded, remainder) = decode_entry(sans_payload).unwrap();

        assert!(remainder.is_empty());
        assert!(!decoded.has_payload());
        assert_eq!(decoded.payload_size(), entry.payload_size());
    }

    #[rstest]
    fn streams_accumulate_entries_on_failure(key_pair: KeyPair) {
        let entries = sign_log(&key_pair, &LogId::default(), 3);

        let mut bytes = Vec::new();
        for entry in &entries {
            bytes.extend_from_slice(&encode_full(entry).unwrap());
        }

        assert_eq!(decode_stream(&bytes).unwrap().len(), 3);

        // Chop the last record in half
        let err = decode_stream(&bytes[..bytes.len() - 40]).unwrap_err();
        assert_eq!(err.entries.len(), 2);
    }
}
