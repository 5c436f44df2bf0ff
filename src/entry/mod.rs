// SPDX-License-Identifier: AGPL-3.0-or-later

//! Create, sign, encode and decode [`Bamboo`] entries.
//!
//! Bamboo entries are the main data type of baobab. Entries are organised in a single-writer
//! append-only log structure per author and log id, created and signed by holders of private
//! keys and persisted in the content store.
//!
//! [`Bamboo`]: https://github.com/AljoschaMeyer/bamboo
mod decode;
mod encode;
mod encoded_entry;
#[allow(clippy::module_inception)]
mod entry;
mod error;
mod log_id;
mod seq_num;
mod signature;
mod validate;

pub use decode::{decode_entry, decode_stream};
pub use encode::{encode_entry, encode_full, encode_preamble, sign_entry};
pub use encoded_entry::EncodedEntry;
pub use entry::Entry;
pub use error::{
    DecodeEntryError, DecodeStreamError, EncodeEntryError, SeqNumError, ValidationError,
};
pub use log_id::LogId;
pub use seq_num::SeqNum;
pub use signature::Signature;
pub use validate::{validate_links, validate_payload, validate_signature};

/// Tag byte every entry begins with, reserved for future format revisions.
pub const ENTRY_TAG: u8 = 0x00;

/// Number of bytes the fixed entry preamble (tag and author) occupies at least.
pub const MIN_ENTRY_SIZE: usize = 33;

/// Size of entry signatures.
pub const SIGNATURE_SIZE: usize = 64;
