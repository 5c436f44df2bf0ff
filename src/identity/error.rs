// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for creating key pairs, validating authors and resolving identities.
use thiserror::Error;

/// Custom error types for key pairs.
#[derive(Error, Debug)]
pub enum KeyPairError {
    /// Handle errors from `ed25519` crate.
    #[error(transparent)]
    Ed25519(#[from] ed25519_dalek::ed25519::Error),

    /// Key material does not have the right length.
    #[error("invalid key length")]
    InvalidLength,
}

/// Custom error types for `Author`.
#[derive(Error, Debug)]
#[allow(missing_copy_implementations)]
pub enum AuthorError {
    /// Author does not decode to a public key of the right length.
    #[error("invalid public key length")]
    InvalidLength,

    /// Author string contains characters outside the base62 alphabet.
    #[error("invalid base62 encoding in author string")]
    InvalidBase62Encoding,
}

/// Error types raised by identity store operations and author resolution.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Secret key material was passed in an unusable shape.
    #[error("unusable arguments for identity operation")]
    BadArgs,

    /// A supposed base62 string did not decode.
    #[error("invalid base62 encoding")]
    BadBase62,

    /// Alias is not present in the identity store.
    #[error("no such identity: {0}")]
    NoSuchIdentity(String),

    /// Short form or alias could not be resolved to exactly one author.
    #[error("unknown identity: {0}")]
    UnknownIdentity(String),

    /// Alias is empty or reserved.
    #[error("invalid identity name: {0}")]
    Badname(String),

    /// Handle errors from `Author` validation.
    #[error(transparent)]
    AuthorError(#[from] AuthorError),

    /// Handle errors from key pair handling.
    #[error(transparent)]
    KeyPairError(#[from] KeyPairError),

    /// Handle errors from the identity table file.
    #[error(transparent)]
    StoreError(#[from] crate::store::StoreError),
}
