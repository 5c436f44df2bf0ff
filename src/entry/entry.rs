// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::entry::{LogId, SeqNum, Signature, ValidationError};
use crate::hash::Hash;
use crate::identity::Author;
use crate::Validate;

/// Entry of an append-only log based on [`Bamboo`] specification.
///
/// Entries are the canonical record of baobab. They are organised in a single-writer append-only
/// log structure per author and log id, created and signed by holders of private keys.
///
/// Entries are separated from the actual payload data so that payloads can be dropped or
/// transported independently without losing the integrity of the log. Each entry holds the hash
/// and byte size of its payload; the payload itself may be absent.
///
/// [`Bamboo`]: https://github.com/AljoschaMeyer/bamboo
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Author (public key) which signed this entry.
    pub(crate) author: Author,

    /// Log this entry was written to.
    pub(crate) log_id: LogId,

    /// Position of this entry in its log.
    pub(crate) seq_num: SeqNum,

    /// Hash of the lipmaa entry, present whenever it differs from the backlink target.
    pub(crate) lipmaalink: Option<Hash>,

    /// Hash of the previous entry, absent only on the first entry of a log.
    pub(crate) backlink: Option<Hash>,

    /// Byte length of the payload.
    pub(crate) payload_size: u64,

    /// Hash of the payload.
    pub(crate) payload_hash: Hash,

    /// Ed25519 signature over the entry preamble.
    pub(crate) signature: Signature,

    /// Payload bytes, may be transported or stored separately.
    pub(crate) payload: Option<Vec<u8>>,
}

impl Entry {
    /// Returns author of entry.
    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Returns log id of entry.
    pub fn log_id(&self) -> &LogId {
        &self.log_id
    }

    /// Returns sequence number of entry.
    pub fn seq_num(&self) -> &SeqNum {
        &self.seq_num
    }

    /// Returns hash of lipmaa entry when given.
    pub fn lipmaalink(&self) -> Option<&Hash> {
        self.lipmaalink.as_ref()
    }

    /// Returns hash of backlink entry when given.
    pub fn backlink(&self) -> Option<&Hash> {
        self.backlink.as_ref()
    }

    /// Returns payload size of entry.
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    /// Returns payload hash of entry.
    pub fn payload_hash(&self) -> &Hash {
        &self.payload_hash
    }

    /// Returns signature of entry.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns payload of entry when present.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Returns true if entry carries its payload.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Returns true if a lipmaalink has to be given for this entry.
    pub fn is_lipmaalink_required(&self) -> bool {
        self.seq_num.is_lipmaalink_required()
    }
}

impl Validate for Entry {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        crate::entry::validate_links(self)
    }
}
