// SPDX-License-Identifier: AGPL-3.0-or-later

//! # baobab
//!
//! A local engine for [`Bamboo`] append-only logs: cryptographically signed, hash-chained
//! sequences of entries authored by Ed25519 key holders. The engine creates, validates,
//! persists, imports, exports and prunes such logs under a hierarchical namespace
//! (clump → author → log id → sequence number) and tolerates partial replication.
//!
//! [`Bamboo`]: https://github.com/AljoschaMeyer/bamboo
#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]
pub mod base62;
pub mod engine;
pub mod entry;
pub mod hash;
pub mod identity;
pub mod interchange;
pub mod store;
#[cfg(test)]
mod test_utils;

pub use engine::{Baobab, Options};

/// Trait used by baobab structs to validate data formats.
///
/// Use this trait to check against canonic formats of data (like authors or yamf hashes) coming
/// in via deserialization, constructors or (string) conversion.
pub trait Validate {
    /// Validation error type.
    type Error: std::fmt::Debug + std::error::Error + Send + Sync + 'static;

    /// Validates baobab data type instance.
    fn validate(&self) -> Result<(), Self::Error>;
}

/// Init pretty_env_logger before the test suite runs to handle logging outputs.
///
/// We output log information using the `log` crate. In itself this doesn't print out any logging
/// information, library users can capture and handle the emitted logs using a log handler. Here
/// we use `pretty_env_logger` to handle logs emitted while running our tests.
///
/// The `ctor` crate is used to define a global constructor function. This method will be run
/// before any of the test suites.
#[cfg(unix)]
#[cfg(test)]
#[ctor::ctor]
fn init() {
    // If the `RUST_LOG` env var is not set skip initiation as we don't want to see any logs.
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init();
    }
}
