// SPDX-License-Identifier: AGPL-3.0-or-later

use std::convert::TryFrom;
use std::fmt::Display;
use std::hash::Hash as StdHash;

use ed25519_dalek::{PublicKey, PUBLIC_KEY_LENGTH};
use serde::{Deserialize, Serialize};

use crate::identity::AuthorError;
use crate::Validate;

/// Authors are base62 encoded Ed25519 public key strings.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, StdHash, PartialOrd, Ord)]
pub struct Author(String);

impl Author {
    /// Validates and wraps an Ed25519 public key string into a new `Author` instance.
    pub fn new(value: &str) -> Result<Self, AuthorError> {
        let author = Self(String::from(value));
        author.validate()?;
        Ok(author)
    }

    /// Wraps raw public key bytes into a new `Author` instance.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AuthorError> {
        if bytes.len() != PUBLIC_KEY_LENGTH {
            return Err(AuthorError::InvalidLength);
        }

        Ok(Self(crate::base62::encode(bytes)))
    }

    /// Returns author as base62 string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the decoded 32 public key bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        // Unwrap as we already validated the author
        decode_public_key(&self.0).unwrap()
    }
}

/// Decodes a base62 author string into exactly 32 public key bytes.
///
/// Base62 drops leading zero bytes of the key material, the decoded value is padded back to the
/// full key length.
fn decode_public_key(value: &str) -> Result<Vec<u8>, AuthorError> {
    let decoded = crate::base62::decode(value).map_err(|_| AuthorError::InvalidBase62Encoding)?;

    if decoded.len() > PUBLIC_KEY_LENGTH {
        return Err(AuthorError::InvalidLength);
    }

    let mut bytes = vec![0u8; PUBLIC_KEY_LENGTH - decoded.len()];
    bytes.extend_from_slice(&decoded);
    Ok(bytes)
}

/// Convert Ed25519 `PublicKey` to `Author` instance.
impl From<&PublicKey> for Author {
    fn from(public_key: &PublicKey) -> Self {
        Self(crate::base62::encode(&public_key.to_bytes()))
    }
}

/// Convert `Author` to Ed25519 `PublicKey` instance.
impl TryFrom<&Author> for PublicKey {
    type Error = AuthorError;

    fn try_from(author: &Author) -> Result<Self, Self::Error> {
        let bytes = decode_public_key(&author.0)?;
        PublicKey::from_bytes(&bytes).map_err(|_| AuthorError::InvalidLength)
    }
}

impl Validate for Author {
    type Error = AuthorError;

    fn validate(&self) -> Result<(), Self::Error> {
        decode_public_key(&self.0)?;
        Ok(())
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
