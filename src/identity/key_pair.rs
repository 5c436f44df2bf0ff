// SPDX-License-Identifier: AGPL-3.0-or-later

use ed25519_dalek::{
    Keypair as Ed25519Keypair, PublicKey, SecretKey, Signature, Signer, Verifier,
    SECRET_KEY_LENGTH,
};
use rand::rngs::OsRng;

use crate::identity::{Author, KeyPairError};

/// Ed25519 key pair for authors to sign bamboo entries with.
#[derive(Debug)]
pub struct KeyPair(Ed25519Keypair);

impl KeyPair {
    /// Generates a new key pair using the systems random number generator (CSPRNG) as a seed.
    ///
    /// This uses `getrandom` for random number generation internally. See [`getrandom`] crate for
    /// supported platforms.
    ///
    /// [`getrandom`]: https://docs.rs/getrandom/0.2.1/getrandom/
    pub fn new() -> Self {
        let mut csprng: OsRng = OsRng {};
        let key_pair = Ed25519Keypair::generate(&mut csprng);
        Self(key_pair)
    }

    /// Derives a key pair from the raw bytes of its secret half.
    pub fn from_private_key_bytes(bytes: &[u8]) -> Result<Self, KeyPairError> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyPairError::InvalidLength);
        }

        let private_key = SecretKey::from_bytes(bytes)?;

        // Derive public part from secret part
        let public_key: PublicKey = (&private_key).into();

        // Assemble key pair from both parts
        let bytes = [private_key.to_bytes(), public_key.to_bytes()].concat();
        let key_pair = Ed25519Keypair::from_bytes(&bytes)?;

        Ok(KeyPair(key_pair))
    }

    /// Returns the public half of the key pair.
    pub fn public_key(&self) -> &PublicKey {
        &self.0.public
    }

    /// Returns the private half of the key pair.
    pub fn private_key(&self) -> &SecretKey {
        &self.0.secret
    }

    /// Returns the author representation of the public half.
    pub fn author(&self) -> Author {
        Author::from(self.public_key())
    }

    /// Returns the 64 byte `secret ‖ public` concatenation used as signing key.
    pub fn signing_key_bytes(&self) -> Vec<u8> {
        [self.0.secret.to_bytes(), self.0.public.to_bytes()].concat()
    }

    /// Sign a message using this key pair.
    pub fn sign(&self, message: &[u8]) -> Signature {
        self.0.sign(message)
    }

    /// Verify the integrity of a signed message.
    pub fn verify(
        public_key: &PublicKey,
        message: &[u8],
        signature: &Signature,
    ) -> Result<(), KeyPairError> {
        public_key.verify(message, signature)?;
        Ok(())
    }
}

impl Default for KeyPair {
    fn default() -> Self {
        Self::new()
    }
}
