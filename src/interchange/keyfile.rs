// SPDX-License-Identifier: AGPL-3.0-or-later

use serde::{Deserialize, Serialize};

/// JSON representation of one exported identity.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Keyfile {
    /// Producing system, always `"baobab"`.
    pub source: String,

    /// Encoding of the key material, always `"base62"`.
    pub key_encoding: String,

    /// Key algorithm, always `"ed25519"`.
    pub key_type: String,

    /// Alias of the identity.
    pub identity: String,

    /// Base62 encoded public key.
    pub public_key: String,

    /// Base62 encoded secret key.
    pub secret_key: String,
}

impl Keyfile {
    /// Assembles a keyfile for one identity.
    pub fn new(identity: &str, public_key: &str, secret_key: &str) -> Self {
        Self {
            source: "baobab".to_owned(),
            key_encoding: "base62".to_owned(),
            key_type: "ed25519".to_owned(),
            identity: identity.to_owned(),
            public_key: public_key.to_owned(),
            secret_key: secret_key.to_owned(),
        }
    }
}
