// SPDX-License-Identifier: AGPL-3.0-or-later

//! Payload and entry digests in the yamf "Yet-Another-Multi-Format" container.
#[allow(clippy::module_inception)]
mod hash;

mod error;

pub use error::HashError;
pub use hash::{Blake2bArrayVec, Hash, YAMF_HASH_SIZE};
