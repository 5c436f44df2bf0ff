// SPDX-License-Identifier: AGPL-3.0-or-later

//! Fixtures for key pairs, hashes, signed logs and engines backed by temporary spool
//! directories.
use rstest::fixture;
use tempfile::TempDir;

use crate::engine::Baobab;
use crate::entry::{encode_entry, sign_entry, EncodedEntry, Entry, LogId, SeqNum};
use crate::hash::Hash;
use crate::identity::KeyPair;

/// Private key used for deterministic test entries.
pub const PRIVATE_KEY: &str = "1d0d93e25885c0a23d2cdebb9cebdee58dbdb30dbd2b34e1c0e46297e3d12f73";

/// Fixture which injects the default deterministic key pair.
#[fixture]
pub fn key_pair() -> KeyPair {
    let bytes = hex::decode(PRIVATE_KEY).unwrap();
    KeyPair::from_private_key_bytes(&bytes).unwrap()
}

/// Fixture which injects a fresh random key pair.
#[fixture]
pub fn random_key_pair() -> KeyPair {
    KeyPair::new()
}

/// Fixture which injects the hash of a random value.
#[fixture]
pub fn random_hash() -> Hash {
    let bytes: [u8; 32] = rand::random();
    Hash::new_from_bytes(&bytes).unwrap()
}

/// Builds a correctly linked log of `count` entries signed by `key_pair`.
///
/// Payloads are `"Entry: <seq>"`, matching the logs the engine tests append.
pub fn sign_log(key_pair: &KeyPair, log_id: &LogId, count: u64) -> Vec<Entry> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut encoded: Vec<EncodedEntry> = Vec::new();

    for seq in 1..=count {
        let seq_num = SeqNum::new(seq).unwrap();
        let backlink = seq_num
            .backlink_seq_num()
            .map(|link| encoded[link.as_u64() as usize - 1].hash());
        let lipmaalink = seq_num
            .lipmaalink_seq_num()
            .map(|link| encoded[link.as_u64() as usize - 1].hash());

        let payload = format!("Entry: {}", seq);
        let entry = sign_entry(
            log_id,
            &seq_num,
            lipmaalink.as_ref(),
            backlink.as_ref(),
            payload.as_bytes(),
            key_pair,
        )
        .unwrap();

        encoded.push(encode_entry(&entry).unwrap());
        entries.push(entry);
    }

    entries
}

/// Fixture which injects an engine over a fresh temporary spool directory.
///
/// The temporary directory handle is returned alongside so it outlives the engine.
#[fixture]
pub fn engine() -> (TempDir, Baobab) {
    let spool_dir = TempDir::new().unwrap();
    let baobab = Baobab::open(spool_dir.path()).unwrap();
    (spool_dir, baobab)
}

/// Appends `count` `"Entry: <n>"` payloads to the identity's default log.
pub fn append_many(baobab: &Baobab, alias: &str, count: u64) -> Vec<Entry> {
    (1..=count)
        .map(|index| {
            baobab
                .append(format!("Entry: {}", index).as_bytes(), alias, &Default::default())
                .unwrap()
        })
        .collect()
}
