// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use ed25519_dalek::SECRET_KEY_LENGTH;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::identity::{Author, IdentityError, KeyPair};
use crate::store::keyed_file::KeyedFile;
use crate::store::StoreError;

/// Length of a base62 encoded 32 byte key.
const BASE62_KEY_LENGTH: usize = 43;

/// Persisted key material of one identity.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct IdentityRecord {
    #[serde(with = "serde_bytes")]
    secret: Vec<u8>,
    #[serde(with = "serde_bytes")]
    public: Vec<u8>,
}

/// Addressable parts of an identity's key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPart {
    /// The 32 byte secret key.
    Secret,

    /// The 32 byte public key.
    Public,

    /// The 64 byte `secret ‖ public` concatenation accepted by the signing primitive.
    Signing,
}

/// Keypair lifecycle: create, rename, drop, list and key access by alias.
///
/// Identities are global, one table file (`identity.dets`) per spool directory. Dropping an
/// identity destroys its secret key.
#[derive(Debug)]
pub struct IdentityStore {
    table: KeyedFile<String, IdentityRecord>,
}

impl IdentityStore {
    /// Opens the identity table at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            table: KeyedFile::open(path)?,
        })
    }

    /// Creates an identity under `alias` and returns its author.
    ///
    /// The secret may be omitted (a fresh key is generated), passed as raw 32 bytes or as a
    /// 43 character base62 string. An existing alias is overwritten.
    pub fn create(&mut self, alias: &str, secret: Option<&[u8]>) -> Result<Author, IdentityError> {
        validate_alias(alias)?;

        let key_pair = match secret {
            None => KeyPair::new(),
            Some(bytes) if bytes.len() == SECRET_KEY_LENGTH => {
                KeyPair::from_private_key_bytes(bytes)?
            }
            Some(bytes) if bytes.len() == BASE62_KEY_LENGTH => {
                let encoded =
                    std::str::from_utf8(bytes).map_err(|_| IdentityError::BadBase62)?;
                let decoded =
                    crate::base62::decode(encoded).map_err(|_| IdentityError::BadBase62)?;
                if decoded.len() > SECRET_KEY_LENGTH {
                    return Err(IdentityError::BadBase62);
                }

                // Base62 drops leading zero bytes, pad the secret back to full length
                let mut key_bytes = vec![0u8; SECRET_KEY_LENGTH - decoded.len()];
                key_bytes.extend_from_slice(&decoded);
                KeyPair::from_private_key_bytes(&key_bytes)?
            }
            Some(_) => return Err(IdentityError::BadArgs),
        };

        let author = key_pair.author();
        debug!("Creating identity {} as {}", alias, author);

        self.table.insert(
            alias.to_owned(),
            IdentityRecord {
                secret: key_pair.private_key().to_bytes().to_vec(),
                public: key_pair.public_key().to_bytes().to_vec(),
            },
        )?;

        Ok(author)
    }

    /// Renames an identity, its key material is preserved.
    pub fn rename(&mut self, old_alias: &str, new_alias: &str) -> Result<Author, IdentityError> {
        validate_alias(new_alias)?;

        let record = self
            .table
            .get(&old_alias.to_owned())
            .cloned()
            .ok_or_else(|| IdentityError::NoSuchIdentity(old_alias.to_owned()))?;

        let author = Author::from_bytes(&record.public)?;
        debug!("Renaming identity {} to {}", old_alias, new_alias);

        self.table.insert(new_alias.to_owned(), record)?;
        if old_alias != new_alias {
            self.table.remove(&old_alias.to_owned())?;
        }

        Ok(author)
    }

    /// Drops an identity, destroying its secret key.
    pub fn remove(&mut self, alias: &str) -> Result<(), IdentityError> {
        debug!("Dropping identity {}", alias);

        if !self.table.remove(&alias.to_owned())? {
            return Err(IdentityError::NoSuchIdentity(alias.to_owned()));
        }

        Ok(())
    }

    /// Lists all identities as `(alias, author)` pairs, ordered by alias.
    pub fn list(&self) -> Vec<(String, Author)> {
        self.table
            .iter()
            .map(|(alias, record)| {
                // Unwrap as only valid public keys are persisted
                (alias.clone(), Author::from_bytes(&record.public).unwrap())
            })
            .collect()
    }

    /// Returns the requested part of an identity's key material.
    pub fn key(&self, alias: &str, part: KeyPart) -> Result<Vec<u8>, IdentityError> {
        let record = self
            .table
            .get(&alias.to_owned())
            .ok_or_else(|| IdentityError::NoSuchIdentity(alias.to_owned()))?;

        let bytes = match part {
            KeyPart::Secret => record.secret.clone(),
            KeyPart::Public => record.public.clone(),
            KeyPart::Signing => [&record.secret[..], &record.public[..]].concat(),
        };

        Ok(bytes)
    }

    /// Returns the full key pair of an identity.
    pub fn key_pair(&self, alias: &str) -> Result<KeyPair, IdentityError> {
        let secret = self.key(alias, KeyPart::Secret)?;
        Ok(KeyPair::from_private_key_bytes(&secret)?)
    }

    /// Returns the authors of all identities.
    pub fn authors(&self) -> Vec<Author> {
        self.list().into_iter().map(|(_, author)| author).collect()
    }

    /// Returns true when any identity owns the given author.
    pub fn has_author(&self, author: &Author) -> bool {
        self.authors().iter().any(|own| own == author)
    }

    /// Deterministic byte representation of the table, input to the status digest.
    pub fn digest_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();

        for (alias, record) in self.table.iter() {
            bytes.extend_from_slice(alias.as_bytes());
            bytes.extend_from_slice(&record.public);
        }

        bytes
    }
}

/// Aliases are non-empty and never begin with `~`, which is reserved for short-form resolution.
fn validate_alias(alias: &str) -> Result<(), IdentityError> {
    if alias.is_empty() || alias.starts_with('~') {
        return Err(IdentityError::Badname(alias.to_owned()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::identity::IdentityError;

    use super::{IdentityStore, KeyPart};

    fn store() -> (TempDir, IdentityStore) {
        let dir = TempDir::new().unwrap();
        let store = IdentityStore::open(&dir.path().join("identity.dets")).unwrap();
        (dir, store)
    }

    #[test]
    fn create_and_list() {
        let (_dir, mut store) = store();

        let author_b = store.create("beth", None).unwrap();
        let author_a = store.create("abe", None).unwrap();

        assert_eq!(
            store.list(),
            vec![("abe".to_string(), author_a), ("beth".to_string(), author_b)]
        );
    }

    #[test]
    fn create_from_existing_secret() {
        let (_dir, mut store) = store();

        let author = store.create("testy", None).unwrap();
        let secret = store.key("testy", KeyPart::Secret).unwrap();

        // Raw secret bytes reproduce the same author
        let restored = store.create("again", Some(&secret)).unwrap();
        assert_eq!(author, restored);

        // So does the base62 form
        let encoded = crate::base62::encode(&secret);
        let restored = store.create("andagain", Some(encoded.as_bytes())).unwrap();
        assert_eq!(author, restored);

        assert!(matches!(
            store.create("bad", Some(&secret[..7])),
            Err(IdentityError::BadArgs)
        ));
        assert!(matches!(
            store.create("bad", Some(&[b'!'; 43])),
            Err(IdentityError::BadBase62)
        ));
    }

    #[test]
    fn rename_preserves_keys() {
        let (_dir, mut store) = store();

        let author = store.create("old", None).unwrap();
        let signing = store.key("old", KeyPart::Signing).unwrap();

        let renamed = store.rename("old", "new").unwrap();
        assert_eq!(author, renamed);
        assert_eq!(store.key("new", KeyPart::Signing).unwrap(), signing);
        assert!(store.key("old", KeyPart::Secret).is_err());

        assert!(matches!(
            store.rename("gone", "whatever"),
            Err(IdentityError::NoSuchIdentity(_))
        ));
        assert!(matches!(
            store.rename("new", "~reserved"),
            Err(IdentityError::Badname(_))
        ));
    }

    #[test]
    fn remove_destroys_key_material() {
        let (_dir, mut store) = store();

        store.create("testy", None).unwrap();
        assert!(store.remove("testy").is_ok());
        assert!(matches!(
            store.remove("testy"),
            Err(IdentityError::NoSuchIdentity(_))
        ));
        assert!(store.key("testy", KeyPart::Public).is_err());
    }

    #[test]
    fn signing_key_shape() {
        let (_dir, mut store) = store();

        store.create("testy", None).unwrap();
        let secret = store.key("testy", KeyPart::Secret).unwrap();
        let public = store.key("testy", KeyPart::Public).unwrap();
        let signing = store.key("testy", KeyPart::Signing).unwrap();

        assert_eq!(signing.len(), 64);
        assert_eq!(&signing[..32], &secret[..]);
        assert_eq!(&signing[32..], &public[..]);
    }
}
