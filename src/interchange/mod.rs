// SPDX-License-Identifier: AGPL-3.0-or-later

//! Import and export of log bundles.
//!
//! An exported spool is a directory of per-identity keyfiles and per-log binary files:
//!
//! ```text
//! <path>/identities/<alias>.keyfile.json
//! <path>/content/<clump_id>/<author>_<log_id>.bamboo.log
//! ```
//!
//! Log files are the concatenation of every entry in ascending sequence order, each with its
//! payload appended. Import mirrors the layout and merges with replication awareness: entries
//! are accepted when they validate, even when their backlink target is not stored locally.
mod error;
mod export;
mod import;
mod keyfile;

pub use error::InterchangeError;
pub use keyfile::Keyfile;

/// File name suffix of exported identities.
pub const KEYFILE_SUFFIX: &str = ".keyfile.json";

/// File name suffix of exported logs.
pub const LOG_SUFFIX: &str = ".bamboo.log";
