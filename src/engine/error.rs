// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types raised by engine operations.
use thiserror::Error;

use crate::entry::{EncodeEntryError, ValidationError};
use crate::identity::IdentityError;
use crate::store::StoreError;

/// Error types raised by engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No content is stored under the requested key.
    #[error("no content stored under the requested key")]
    Missing,

    /// Ranges start at sequence number 2 and must not be empty.
    #[error("range first must be at least 2 and last not before first")]
    BadRange,

    /// The referenced clump does not exist.
    #[error("unknown clump id: {0}")]
    UnknownClumpId(String),

    /// Authors owned by the identity store can not be blocked.
    #[error("can not block an author owned by the identity store")]
    BlockedLocalIdentity,

    /// The content is covered by the clump's block set.
    #[error("store refused blocked content")]
    RefusedBlocked,

    /// Handle errors from resolving identities.
    #[error(transparent)]
    IdentityError(#[from] IdentityError),

    /// Handle errors from validating entries.
    #[error(transparent)]
    ValidationError(#[from] ValidationError),

    /// Handle errors from encoding entries.
    #[error(transparent)]
    EncodeEntryError(#[from] EncodeEntryError),

    /// Handle errors from the table files.
    #[error(transparent)]
    StoreError(#[from] StoreError),
}
