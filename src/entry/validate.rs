// SPDX-License-Identifier: AGPL-3.0-or-later

//! Collection of low-level validation methods for entries.
//!
//! These checks are pure: they need nothing but the entry (and for signatures its preamble
//! bytes). Validation against other entries of the log lives in the engine, which has access to
//! the content store.
use std::convert::TryFrom;

use ed25519_dalek::PublicKey;

use crate::entry::{Entry, Signature, ValidationError};
use crate::identity::{Author, KeyPair};

/// Checks if backlink and lipmaalink are correctly set for the given sequence number.
///
/// First entries do not contain any links. Every other entry has to contain a backlink, and a
/// lipmaalink exactly when it would differ from the backlink.
pub fn validate_links(entry: &Entry) -> Result<(), ValidationError> {
    match (
        entry.seq_num().is_first(),
        entry.backlink().is_some(),
        entry.lipmaalink().is_some(),
        entry.is_lipmaalink_required(),
    ) {
        (true, false, false, _) => Ok(()),
        (true, true, _, _) => Err(ValidationError::InvalidBacklink),
        (true, false, true, _) => Err(ValidationError::InvalidLipmaa),
        (false, false, _, _) => Err(ValidationError::MissingBacklink(entry.seq_num().as_u64())),
        (false, true, true, false) => Err(ValidationError::InvalidLipmaa),
        (false, true, false, true) => Err(ValidationError::MissingLipmaa(
            // Unwrap as a lipmaalink is required for this sequence number
            entry.seq_num().lipmaalink_seq_num().unwrap().as_u64(),
        )),
        (false, true, false, false) => Ok(()),
        (false, true, true, true) => Ok(()),
    }
}

/// Checks if the entry is authentic by verifying the signature against the author and the
/// unsigned preamble bytes.
pub fn validate_signature(
    author: &Author,
    signature: &Signature,
    unsigned_bytes: &[u8],
) -> Result<(), ValidationError> {
    let public_key = PublicKey::try_from(author).map_err(|_| ValidationError::InvalidSig)?;
    let signature =
        ed25519_dalek::Signature::try_from(signature).map_err(|_| ValidationError::InvalidSig)?;

    KeyPair::verify(&public_key, unsigned_bytes, &signature)
        .map_err(|_| ValidationError::InvalidSig)
}

/// Checks if the claimed payload hash and size match the actual payload bytes.
pub fn validate_payload(entry: &Entry, payload: &[u8]) -> Result<(), ValidationError> {
    if entry.payload_size() != payload.len() as u64 {
        return Err(ValidationError::InvalidPayloadHash);
    }

    entry
        .payload_hash()
        .verify(payload)
        .map_err(|_| ValidationError::InvalidPayloadHash)
}
