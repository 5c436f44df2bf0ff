// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for the keyed table files.
use thiserror::Error;

/// Error types raised by reading and writing keyed table files.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Handle errors from the filesystem.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Table file holds bytes which can not be decoded.
    #[error("table file {0} holds undecodable data")]
    Corrupt(String),

    /// Table contents could not be encoded.
    #[error("table contents can not be encoded: {0}")]
    Encode(String),
}
