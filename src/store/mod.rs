// SPDX-License-Identifier: AGPL-3.0-or-later

//! Keyed persistence for entries, identities, block sets and status digests.
//!
//! Every store is a keyed table backed by one file in the spool directory. Mutations rewrite the
//! table through a temporary file and an atomic rename, so a crash at any point leaves either
//! the old or the new table on disk, never a partial one.
mod content;
mod error;
mod identity;
mod keyed_file;
mod metadata;
mod status;

pub use content::{ContentKey, ContentRecord, ContentStore, KeyPattern, RecordPart};
pub use error::StoreError;
pub use identity::{IdentityStore, KeyPart};
pub use metadata::{BlockSpec, MetadataStore};
pub use status::{digest, StatusKind, StatusStore};

/// File name of the global identity table inside the spool directory.
pub const IDENTITY_TABLE: &str = "identity.dets";

/// File name of the per-clump content table.
pub const CONTENT_TABLE: &str = "content.dets";

/// File name of the per-clump status table.
pub const STATUS_TABLE: &str = "status.dets";

/// File name of the per-clump metadata table.
pub const METADATA_TABLE: &str = "metadata.dets";
