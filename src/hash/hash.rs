// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;
use std::hash::Hash as StdHash;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use yamf_hash::{new_blake2b, YamfHash, BLAKE2B_HASH_SIZE, MAX_YAMF_HASH_SIZE};

use crate::hash::HashError;
use crate::Validate;

/// Size of the BLAKE2b digest inside the yamf container.
pub(crate) const HASH_SIZE: usize = BLAKE2B_HASH_SIZE;

/// Size of an encoded yamf hash: two varu64 header bytes plus the digest.
pub const YAMF_HASH_SIZE: usize = MAX_YAMF_HASH_SIZE;

/// Type used for yamf hashes that own their bytes.
pub type Blake2bArrayVec = ArrayVec<[u8; HASH_SIZE]>;

/// Hash of an encoded entry or payload.
///
/// This uses the BLAKE2b algorithm wrapped in [`yamf`] "Yet-Another-Multi-Format" according to
/// the Bamboo specification. Instances hold the encoded container bytes (66 bytes).
///
/// [`yamf`]: https://github.com/bamboo-rs/yamf-hash
#[derive(Clone, Debug, Serialize, Deserialize, Eq, StdHash)]
pub struct Hash(#[serde(with = "serde_bytes")] Vec<u8>);

impl Hash {
    /// Hashes byte data and returns it as `Hash` instance.
    pub fn new_from_bytes(value: &[u8]) -> Result<Self, HashError> {
        let blake2b_hash: YamfHash<Blake2bArrayVec> = new_blake2b(value);

        // Wrap hash in yamf container format
        let mut out = [0u8; MAX_YAMF_HASH_SIZE];
        let size = blake2b_hash
            .encode(&mut out)
            .map_err(|_| HashError::EncodingFailed)?;

        Ok(Self(out[..size].to_vec()))
    }

    /// Validates and wraps already encoded yamf hash bytes into a new `Hash` instance.
    pub fn from_encoded_bytes(bytes: &[u8]) -> Result<Self, HashError> {
        let hash = Self(bytes.to_owned());
        hash.validate()?;
        Ok(hash)
    }

    /// Reads one yamf hash from the front of `bytes`, returns it with the remaining bytes.
    pub fn decode(bytes: &[u8]) -> Result<(Self, &[u8]), HashError> {
        if bytes.len() < MAX_YAMF_HASH_SIZE {
            return Err(HashError::InvalidLength(bytes.len(), MAX_YAMF_HASH_SIZE));
        }

        match YamfHash::<&[u8]>::decode(bytes) {
            Ok((YamfHash::Blake2b(_), remainder)) => {
                let consumed = bytes.len() - remainder.len();
                Ok((Self(bytes[..consumed].to_vec()), remainder))
            }
            _ => Err(HashError::DecodingFailed),
        }
    }

    /// Checks that `value` hashes to this digest.
    pub fn verify(&self, value: &[u8]) -> Result<(), HashError> {
        let expected = Self::new_from_bytes(value)?;

        if *self != expected {
            return Err(HashError::DecodingFailed);
        }

        Ok(())
    }

    /// Returns the encoded yamf container bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the encoded yamf container bytes as owned vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl Validate for Hash {
    type Error = HashError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.len() != MAX_YAMF_HASH_SIZE {
            return Err(HashError::InvalidLength(self.0.len(), MAX_YAMF_HASH_SIZE));
        }

        match YamfHash::<&[u8]>::decode(&self.0) {
            Ok((YamfHash::Blake2b(_), _)) => Ok(()),
            _ => Err(HashError::DecodingFailed),
        }
    }
}

impl PartialEq for Hash {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", crate::base62::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{Hash, YAMF_HASH_SIZE};

    #[test]
    fn new_from_bytes() {
        let hash = Hash::new_from_bytes(&[1, 2, 3]).unwrap();
        assert_eq!(hash.as_bytes().len(), YAMF_HASH_SIZE);
        assert_eq!(hash, Hash::new_from_bytes(&[1, 2, 3]).unwrap());
        assert_ne!(hash, Hash::new_from_bytes(&[1, 2, 4]).unwrap());
    }

    #[test]
    fn verify() {
        let hash = Hash::new_from_bytes(b"bamboo").unwrap();
        assert!(hash.verify(b"bamboo").is_ok());
        assert!(hash.verify(b"baobab").is_err());
    }

    #[test]
    fn decode_from_wire() {
        let hash = Hash::new_from_bytes(b"wire").unwrap();

        // Append trailing bytes, decoding returns them untouched
        let mut bytes = hash.to_bytes();
        bytes.extend_from_slice(&[7, 7, 7]);

        let (decoded, remainder) = Hash::decode(&bytes).unwrap();
        assert_eq!(decoded, hash);
        assert_eq!(remainder, &[7, 7, 7]);
    }

    #[test]
    fn rejects_invalid_containers() {
        assert!(Hash::from_encoded_bytes(&[1, 2, 3]).is_err());
        assert!(Hash::decode(&[0u8; 12]).is_err());
    }
}
