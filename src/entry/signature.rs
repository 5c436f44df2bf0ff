// SPDX-License-Identifier: AGPL-3.0-or-later

use std::convert::TryFrom;

use serde::{Deserialize, Serialize};

use crate::entry::SIGNATURE_SIZE;
use crate::identity::KeyPairError;

/// Ed25519 signature of an entry preamble.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Signature(#[serde(with = "serde_bytes")] Vec<u8>);

impl Signature {
    /// Returns signature as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns signature as owned byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }
}

impl TryFrom<&[u8]> for Signature {
    type Error = KeyPairError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(KeyPairError::InvalidLength);
        }

        Ok(Self(bytes.to_owned()))
    }
}

impl From<&ed25519_dalek::Signature> for Signature {
    fn from(signature: &ed25519_dalek::Signature) -> Self {
        Self(signature.to_bytes().to_vec())
    }
}

impl TryFrom<&Signature> for ed25519_dalek::Signature {
    type Error = KeyPairError;

    fn try_from(signature: &Signature) -> Result<Self, Self::Error> {
        Ok(ed25519_dalek::Signature::try_from(signature.as_bytes())?)
    }
}
