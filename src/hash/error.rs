// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for validating or creating a hash.
use thiserror::Error;

/// Error types for `Hash` struct.
#[derive(Error, Debug)]
pub enum HashError {
    /// Hash has an invalid length.
    #[error("invalid hash length {0} bytes, expected {1} bytes")]
    InvalidLength(usize, usize),

    /// Hash is not a valid yamf BLAKE2b hash.
    #[error("can not decode yamf BLAKE2b hash")]
    DecodingFailed,

    /// Hash could not be encoded into its yamf container.
    #[error("can not encode yamf BLAKE2b hash")]
    EncodingFailed,
}
