// SPDX-License-Identifier: AGPL-3.0-or-later

//! Error types for importing and exporting log bundles.
use thiserror::Error;

use crate::engine::EngineError;

/// Error types raised by import and export.
#[derive(Error, Debug)]
pub enum InterchangeError {
    /// Handle errors from the filesystem.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Handle errors from keyfile JSON encoding.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A keyfile could not be interpreted.
    #[error("malformed keyfile {0}: {1}")]
    BadKeyfile(String, String),

    /// A keyfile's recorded public key does not derive from its secret key.
    #[error("keyfile {0} does not match its secret key")]
    KeyfileMismatch(String),

    /// A log file holds a malformed entry stream.
    #[error("malformed entry stream: {0}")]
    BadBinary(String),

    /// Handle errors from the engine.
    #[error(transparent)]
    EngineError(#[from] EngineError),
}
