// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;
use std::hash::Hash as StdHash;

use serde::{Deserialize, Serialize};

use crate::hash::Hash;

/// Wrapper type for the signed entry bytes without their payload.
///
/// These are the bytes the content store persists for the `entry` half of a record and the bytes
/// back- and lipmaalinks hash. No validation is applied whatsoever; use `decode_entry` to apply
/// all structural checks and get an `Entry` instance.
#[derive(Clone, Debug, PartialEq, Eq, StdHash, Serialize, Deserialize)]
pub struct EncodedEntry(#[serde(with = "serde_bytes")] Vec<u8>);

impl EncodedEntry {
    /// Returns new `EncodedEntry` instance from given bytes.
    ///
    /// This does not apply any validation and should only be used in methods where all checks
    /// have taken place before.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_owned())
    }

    /// Generates and returns hash of encoded entry.
    pub fn hash(&self) -> Hash {
        // Unwrap as hashing existing bytes can not fail
        Hash::new_from_bytes(&self.0).unwrap()
    }

    /// Returns entry as bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Returns a reference to the entry bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the size (number of bytes) of the encoded entry.
    pub fn size(&self) -> u64 {
        self.0.len() as u64
    }
}

impl Display for EncodedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}
