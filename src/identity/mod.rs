// SPDX-License-Identifier: AGPL-3.0-or-later

//! Ed25519 key pairs and their base62 public key representation.
mod author;
mod error;
mod key_pair;

pub use author::Author;
pub use error::{AuthorError, IdentityError, KeyPairError};
pub use key_pair::KeyPair;
