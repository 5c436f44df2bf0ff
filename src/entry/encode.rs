// SPDX-License-Identifier: AGPL-3.0-or-later

//! Methods to sign and encode an entry.
//!
//! Create a new signed `Entry` with the low-level `sign_entry` method which takes in the entry
//! arguments, payload and `KeyPair` for signing. Use `encode_entry` to receive the signed entry
//! bytes the content store persists and links hash, or `encode_full` for the transport form with
//! the payload appended.
//!
//! ```text
//! ┌─────┐                     ┌────────────┐
//! │Entry│ ──encode_entry()──► │EncodedEntry│ ─────► bytes
//! └─────┘                     └────────────┘
//! ```
use std::convert::TryFrom;

use crate::entry::validate::validate_links;
use crate::entry::{
    EncodeEntryError, EncodedEntry, Entry, LogId, SeqNum, Signature, ENTRY_TAG, SIGNATURE_SIZE,
};
use crate::hash::Hash;
use crate::identity::KeyPair;

/// Appends the varu64 encoding of `value` to `bytes`.
fn push_varu64(bytes: &mut Vec<u8>, value: u64) {
    let mut out = [0u8; 9];
    let size = varu64::encode(value, &mut out);
    bytes.extend_from_slice(&out[..size]);
}

/// Encodes the unsigned preamble of an entry.
///
/// This is the exact input to the signature domain: everything from the tag byte through the
/// payload hash, with absent optional links contributing zero bytes.
pub fn encode_preamble(entry: &Entry) -> Result<Vec<u8>, EncodeEntryError> {
    // Make sure the links are correctly set for the sequence number before emitting them
    validate_links(entry)?;

    let mut bytes = vec![ENTRY_TAG];
    bytes.extend_from_slice(&entry.author().to_bytes());
    push_varu64(&mut bytes, entry.log_id().as_u64());
    push_varu64(&mut bytes, entry.seq_num().as_u64());

    if let Some(lipmaalink) = entry.lipmaalink() {
        bytes.extend_from_slice(lipmaalink.as_bytes());
    }

    if let Some(backlink) = entry.backlink() {
        bytes.extend_from_slice(backlink.as_bytes());
    }

    push_varu64(&mut bytes, entry.payload_size());
    bytes.extend_from_slice(entry.payload_hash().as_bytes());

    Ok(bytes)
}

/// Encodes an entry into its signed binary form without the payload.
///
/// These are the bytes persisted as the `entry` half of a content record and the input to back-
/// and lipmaalink hashes.
pub fn encode_entry(entry: &Entry) -> Result<EncodedEntry, EncodeEntryError> {
    let mut bytes = encode_preamble(entry)?;
    bytes.extend_from_slice(entry.signature().as_bytes());
    Ok(EncodedEntry::from_bytes(&bytes))
}

/// Encodes an entry with its payload appended, the transport and interchange form.
pub fn encode_full(entry: &Entry) -> Result<Vec<u8>, EncodeEntryError> {
    let mut bytes = encode_entry(entry)?.into_bytes();

    if let Some(payload) = entry.payload() {
        bytes.extend_from_slice(payload);
    }

    Ok(bytes)
}

/// Takes entry arguments (log id, sequence number, links), payload and a [`KeyPair`], returns a
/// signed `Entry` instance.
///
/// This applies only basic checks that the links are correctly set for the given sequence number.
/// Please note though that this method does not check for correct log integrity!
pub fn sign_entry(
    log_id: &LogId,
    seq_num: &SeqNum,
    lipmaalink: Option<&Hash>,
    backlink: Option<&Hash>,
    payload: &[u8],
    key_pair: &KeyPair,
) -> Result<Entry, EncodeEntryError> {
    // Generate payload hash and size from payload bytes. Unwrap as hashing bytes can not fail.
    let payload_hash = Hash::new_from_bytes(payload).unwrap();

    // The signature is attached after signing the preamble below
    let mut entry = Entry {
        author: key_pair.author(),
        log_id: log_id.to_owned(),
        seq_num: seq_num.to_owned(),
        lipmaalink: lipmaalink.cloned(),
        backlink: backlink.cloned(),
        payload_size: payload.len() as u64,
        payload_hash,
        signature: Signature::try_from(&[0u8; SIGNATURE_SIZE][..]).unwrap(),
        payload: Some(payload.to_vec()),
    };

    let unsigned_bytes = encode_preamble(&entry)?;
    let signature = key_pair.sign(&unsigned_bytes);
    entry.signature = Signature::from(&signature);

    Ok(entry)
}
