// SPDX-License-Identifier: AGPL-3.0-or-later

//! The engine object owning all store handles.
//!
//! A [`Baobab`] instance assumes exclusive ownership of its spool directory for its lifetime.
//! Within a process it may be shared across threads: every store sits behind its own mutex and
//! every public mutation is one critical section over the owning store.
mod blocks;
mod error;
mod log;
mod options;
mod validation;

use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use ::log::debug;
use ed25519_dalek::PublicKey;

use crate::identity::{Author, IdentityError};
use crate::store::{
    digest, ContentStore, IdentityStore, KeyPart, MetadataStore, StatusKind, StatusStore,
    StoreError, CONTENT_TABLE, IDENTITY_TABLE, METADATA_TABLE, STATUS_TABLE,
};

pub use error::EngineError;
pub use options::Options;

/// Clump every operation addresses unless told otherwise.
pub const DEFAULT_CLUMP: &str = "default";

/// Store handles of one clump.
#[derive(Debug)]
pub(crate) struct ClumpStores {
    pub(crate) content: Mutex<ContentStore>,
    pub(crate) metadata: Mutex<MetadataStore>,
    pub(crate) status: Mutex<StatusStore>,
}

impl ClumpStores {
    /// Opens (or creates) the three tables of a clump inside `dir`.
    fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;

        Ok(Self {
            content: Mutex::new(ContentStore::open(&dir.join(CONTENT_TABLE))?),
            metadata: Mutex::new(MetadataStore::open(&dir.join(METADATA_TABLE))?),
            status: Mutex::new(StatusStore::open(&dir.join(STATUS_TABLE))?),
        })
    }
}

/// The engine for Bamboo append-only logs.
///
/// Holds the global identity store and one set of content, metadata and status stores per
/// clump, all under one spool directory:
///
/// ```text
/// <spool_dir>/
///   identity.dets
///   <clump_id>/content.dets
///   <clump_id>/status.dets
///   <clump_id>/metadata.dets
/// ```
#[derive(Debug)]
pub struct Baobab {
    spool_dir: PathBuf,
    identities: Mutex<IdentityStore>,
    clumps: RwLock<BTreeMap<String, Arc<ClumpStores>>>,
}

impl Baobab {
    /// Opens the engine over the given spool directory, creating it and the `"default"` clump
    /// when they do not exist yet.
    ///
    /// Clumps are discovered by their `content.dets` table file.
    pub fn open<P: AsRef<Path>>(spool_dir: P) -> Result<Self, EngineError> {
        let spool_dir = spool_dir.as_ref().to_owned();
        fs::create_dir_all(&spool_dir).map_err(StoreError::from)?;

        let identities = IdentityStore::open(&spool_dir.join(IDENTITY_TABLE))?;

        let mut clumps = BTreeMap::new();
        for dir_entry in fs::read_dir(&spool_dir).map_err(StoreError::from)? {
            let path = dir_entry.map_err(StoreError::from)?.path();

            if path.is_dir() && path.join(CONTENT_TABLE).is_file() {
                if let Some(clump_id) = path.file_name().and_then(|name| name.to_str()) {
                    clumps.insert(clump_id.to_owned(), Arc::new(ClumpStores::open(&path)?));
                }
            }
        }

        if !clumps.contains_key(DEFAULT_CLUMP) {
            clumps.insert(
                DEFAULT_CLUMP.to_owned(),
                Arc::new(ClumpStores::open(&spool_dir.join(DEFAULT_CLUMP))?),
            );
        }

        debug!(
            "Opened spool {} with {} clumps",
            spool_dir.display(),
            clumps.len()
        );

        Ok(Self {
            spool_dir,
            identities: Mutex::new(identities),
            clumps: RwLock::new(clumps),
        })
    }

    /// Returns the store handles of a clump.
    pub(crate) fn clump(&self, clump_id: &str) -> Result<Arc<ClumpStores>, EngineError> {
        self.clumps
            .read()
            .unwrap()
            .get(clump_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownClumpId(clump_id.to_owned()))
    }

    /// Creates a clump, returns false when it already existed.
    pub fn create_clump(&self, clump_id: &str) -> Result<bool, EngineError> {
        if clump_id.is_empty() || clump_id.contains('/') {
            return Err(EngineError::UnknownClumpId(clump_id.to_owned()));
        }

        let mut clumps = self.clumps.write().unwrap();
        if clumps.contains_key(clump_id) {
            return Ok(false);
        }

        debug!("Creating clump {}", clump_id);
        let stores = ClumpStores::open(&self.spool_dir.join(clump_id))?;
        clumps.insert(clump_id.to_owned(), Arc::new(stores));
        Ok(true)
    }

    /// Drops a clump with all its stores.
    pub fn drop_clump(&self, clump_id: &str) -> Result<(), EngineError> {
        let mut clumps = self.clumps.write().unwrap();

        if clumps.remove(clump_id).is_none() {
            return Err(EngineError::UnknownClumpId(clump_id.to_owned()));
        }

        debug!("Dropping clump {}", clump_id);
        fs::remove_dir_all(self.spool_dir.join(clump_id)).map_err(StoreError::from)?;
        Ok(())
    }

    /// Lists all clump ids, sorted.
    pub fn clumps(&self) -> Vec<String> {
        self.clumps.read().unwrap().keys().cloned().collect()
    }

    /// Resolves any accepted author reference to its base62 form.
    ///
    /// Resolution rules, in order:
    ///
    /// 1. A reference starting with `~` is a prefix search across all known authors (identities
    ///    and stored content); the match must be unique.
    /// 2. A 43 character reference is taken as base62 public key.
    /// 3. A 32 byte reference is taken as raw public key.
    /// 4. Everything else is looked up as identity alias.
    pub fn resolve_author(&self, reference: &str) -> Result<Author, IdentityError> {
        if let Some(prefix) = reference.strip_prefix('~') {
            let mut candidates: Vec<String> = self
                .identities
                .lock()
                .unwrap()
                .authors()
                .iter()
                .map(|author| author.as_str().to_owned())
                .collect();

            let clumps = self.clumps.read().unwrap();
            for stores in clumps.values() {
                candidates.extend(stores.content.lock().unwrap().authors());
            }

            candidates.sort();
            candidates.dedup();
            candidates.retain(|candidate| candidate.starts_with(prefix));

            match candidates.as_slice() {
                [author] => Ok(Author::new(author)?),
                _ => Err(IdentityError::UnknownIdentity(reference.to_owned())),
            }
        } else if reference.len() == 43 {
            Author::new(reference).map_err(|_| IdentityError::BadBase62)
        } else if reference.as_bytes().len() == 32 {
            Ok(Author::from_bytes(reference.as_bytes())?)
        } else {
            let public = self
                .identities
                .lock()
                .unwrap()
                .key(reference, KeyPart::Public)
                .map_err(|_| IdentityError::UnknownIdentity(reference.to_owned()))?;
            Ok(Author::from_bytes(&public)?)
        }
    }

    /// Creates an identity under `alias` and returns its author. See
    /// [`IdentityStore::create`](crate::store::IdentityStore::create) for accepted secrets.
    pub fn create_identity(
        &self,
        alias: &str,
        secret: Option<&[u8]>,
    ) -> Result<Author, EngineError> {
        let author = self.identities.lock().unwrap().create(alias, secret)?;
        self.invalidate_identity_digests()?;
        Ok(author)
    }

    /// Renames an identity, keys are preserved.
    pub fn rename_identity(&self, old_alias: &str, new_alias: &str) -> Result<Author, EngineError> {
        let author = self
            .identities
            .lock()
            .unwrap()
            .rename(old_alias, new_alias)?;
        self.invalidate_identity_digests()?;
        Ok(author)
    }

    /// Drops an identity, destroying its secret key.
    pub fn drop_identity(&self, alias: &str) -> Result<(), EngineError> {
        self.identities.lock().unwrap().remove(alias)?;
        self.invalidate_identity_digests()?;
        Ok(())
    }

    /// Lists all identities as `(alias, author)` pairs, ordered by alias.
    pub fn identities(&self) -> Vec<(String, Author)> {
        self.identities.lock().unwrap().list()
    }

    /// Returns the requested part of an identity's key material.
    pub fn identity_key(&self, alias: &str, part: KeyPart) -> Result<Vec<u8>, EngineError> {
        Ok(self.identities.lock().unwrap().key(alias, part)?)
    }

    /// Signs arbitrary bytes with a stored identity, returns the 64 byte signature.
    pub fn sign(&self, alias: &str, bytes: &[u8]) -> Result<Vec<u8>, EngineError> {
        let key_pair = self.identities.lock().unwrap().key_pair(alias)?;
        Ok(key_pair.sign(bytes).to_bytes().to_vec())
    }

    /// Verifies a detached signature against any resolvable author reference.
    pub fn verify(
        &self,
        author: &str,
        signature: &[u8],
        bytes: &[u8],
    ) -> Result<bool, EngineError> {
        let author = self.resolve_author(author)?;
        let public_key =
            PublicKey::try_from(&author).map_err(IdentityError::from)?;

        let signature = match ed25519_dalek::Signature::try_from(signature) {
            Ok(signature) => signature,
            Err(_) => return Ok(false),
        };

        Ok(crate::identity::KeyPair::verify(&public_key, bytes, &signature).is_ok())
    }

    /// Returns the current digest of a clump's content or identity table.
    ///
    /// Digests are opaque change tokens: any mutation of the source table changes the value
    /// observed here, unless the mutation was a no-op. They are recomputed lazily after
    /// invalidation.
    pub fn current_hash(&self, kind: StatusKind, clump_id: &str) -> Result<String, EngineError> {
        let clump = self.clump(clump_id)?;

        match kind {
            StatusKind::Content => {
                let content = clump.content.lock().unwrap();
                let mut status = clump.status.lock().unwrap();

                if let Some(value) = status.cached(kind) {
                    return Ok(value);
                }

                let value = digest(&content.digest_bytes());
                status.set(kind, &value)?;
                Ok(value)
            }
            StatusKind::Identity => {
                let identities = self.identities.lock().unwrap();
                let mut status = clump.status.lock().unwrap();

                if let Some(value) = status.cached(kind) {
                    return Ok(value);
                }

                let value = digest(&identities.digest_bytes());
                status.set(kind, &value)?;
                Ok(value)
            }
        }
    }

    /// Drops the recorded content digest of one clump after a mutation.
    pub(crate) fn invalidate_content_digest(&self, clump: &ClumpStores) -> Result<(), EngineError> {
        clump
            .status
            .lock()
            .unwrap()
            .invalidate(StatusKind::Content)?;
        Ok(())
    }

    /// Drops the recorded identity digests of all clumps after an identity mutation.
    ///
    /// Identities are global but their digest is recorded per clump status table.
    fn invalidate_identity_digests(&self) -> Result<(), EngineError> {
        let clumps = self.clumps.read().unwrap();
        for stores in clumps.values() {
            stores
                .status
                .lock()
                .unwrap()
                .invalidate(StatusKind::Identity)?;
        }
        Ok(())
    }
}
