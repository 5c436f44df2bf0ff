// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for encoding, decoding or validating entries and their regarding data types like
//! sequence numbers or log ids.
use thiserror::Error;

use crate::entry::Entry;

/// Errors from `entry::decode` module.
#[derive(Error, Debug)]
pub enum DecodeEntryError {
    /// Binary is shorter than the fields it claims to contain.
    #[error("entry binary is shorter than required")]
    Truncated,

    /// Binary holds bytes which can not be interpreted as an entry.
    #[error("malformed entry binary: {0}")]
    BadBinary(String),
}

/// Error from `decode_stream`, carrying the entries decoded before the malformed record.
#[derive(Error, Debug)]
#[error("malformed entry stream after {} well-formed entries: {source}", entries.len())]
pub struct DecodeStreamError {
    /// Entries decoded before the failure.
    pub entries: Vec<Entry>,

    /// Error raised by the malformed record.
    pub source: DecodeEntryError,
}

/// Errors from `entry::encode` module.
#[derive(Error, Debug)]
pub enum EncodeEntryError {
    /// Handle errors from `entry::validate` module.
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
}

/// Errors from validating entries, both their pure shape and against the content store.
#[derive(Error, Debug)]
#[allow(missing_copy_implementations)]
pub enum ValidationError {
    /// Signature does not verify against the claimed author and entry bytes.
    #[error("signature does not match the claimed author")]
    InvalidSig,

    /// Payload does not hash to the claimed payload hash.
    #[error("payload does not match the claimed payload hash")]
    InvalidPayloadHash,

    /// Backlink hash does not match the stored predecessor, or links are present on a first
    /// entry.
    #[error("backlink is not valid for this entry")]
    InvalidBacklink,

    /// Lipmaalink is present although the sequence number does not demand one, or its hash does
    /// not match the stored target.
    #[error("lipmaalink is not valid for this sequence number")]
    InvalidLipmaa,

    /// Entries past the first one always carry a backlink.
    #[error("entry at sequence number {0} requires a backlink")]
    MissingBacklink(u64),

    /// Lipmaalink or its target entry is required but not available.
    #[error("lipmaalink target at sequence number {0} is required but not available")]
    MissingLipmaa(u64),

    /// A certificate pool member within stored bounds can not be retrieved.
    #[error("certificate pool member at sequence number {0} can not be retrieved")]
    ChainBroken(u64),
}

/// Errors from `SeqNum` struct.
#[derive(Error, Debug)]
#[allow(missing_copy_implementations)]
pub enum SeqNumError {
    /// Sequence numbers are always positive.
    #[error("sequence number can not be zero or negative")]
    NotZeroOrNegative,

    /// Conversion to u64 from string failed.
    #[error("string contains invalid u64 value")]
    InvalidU64String,
}
