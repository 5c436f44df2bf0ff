// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use crate::store::keyed_file::KeyedFile;
use crate::store::StoreError;

/// Number of digest bytes kept in a status table.
///
/// Digests are change tokens, not content identifiers, so the short width is acceptable.
const STATUS_DIGEST_SIZE: usize = 7;

/// The two digests a clump's status table tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    /// Digest over the clump's content table.
    Content,

    /// Digest over the global identity table.
    Identity,
}

impl StatusKind {
    /// Key under which the digest is recorded.
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Content => "content",
            StatusKind::Identity => "identity",
        }
    }
}

/// Per-clump store of content and identity digests.
///
/// Digests are opaque change tokens: a mutation of the source table invalidates the recorded
/// digest, the next read recomputes it lazily.
#[derive(Debug)]
pub struct StatusStore {
    table: KeyedFile<String, String>,
}

impl StatusStore {
    /// Opens the status table at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            table: KeyedFile::open(path)?,
        })
    }

    /// Returns the recorded digest, `None` when it has been invalidated.
    pub fn cached(&self, kind: StatusKind) -> Option<String> {
        self.table.get(&kind.as_str().to_owned()).cloned()
    }

    /// Records a freshly computed digest.
    pub fn set(&mut self, kind: StatusKind, value: &str) -> Result<(), StoreError> {
        self.table.insert(kind.as_str().to_owned(), value.to_owned())
    }

    /// Drops the recorded digest after a mutation of the source table.
    pub fn invalidate(&mut self, kind: StatusKind) -> Result<(), StoreError> {
        self.table.remove(&kind.as_str().to_owned())?;
        Ok(())
    }
}

/// Computes the short base62 change token over the given table bytes.
pub fn digest(bytes: &[u8]) -> String {
    let hash = blake2b_simd::Params::new()
        .hash_length(STATUS_DIGEST_SIZE)
        .hash(bytes);
    crate::base62::encode(hash.as_bytes())
}
