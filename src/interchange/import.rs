// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fs;
use std::path::Path;

use ::log::debug;
use ed25519_dalek::SECRET_KEY_LENGTH;

use crate::engine::{Baobab, Options};
use crate::entry::{decode_stream, Entry};
use crate::identity::KeyPair;
use crate::interchange::{InterchangeError, Keyfile, KEYFILE_SUFFIX, LOG_SUFFIX};

impl Baobab {
    /// Imports an exported directory tree: keyfiles first, then every log file.
    ///
    /// Identities are re-created under their exported alias after cross-checking that the
    /// recorded public key derives from the recorded secret key. Clumps discovered under
    /// `content/` are created when missing. Every log file is ingested through
    /// [`import_binaries`](Baobab::import_binaries) with the default options.
    pub fn import<P: AsRef<Path>>(&self, path: P) -> Result<(), InterchangeError> {
        let path = path.as_ref();

        let identities_dir = path.join("identities");
        if identities_dir.is_dir() {
            for dir_entry in fs::read_dir(&identities_dir)? {
                let file_path = dir_entry?.path();
                if !file_name_of(&file_path).ends_with(KEYFILE_SUFFIX) {
                    continue;
                }

                self.import_keyfile(&file_path)?;
            }
        }

        let content_dir = path.join("content");
        if content_dir.is_dir() {
            for dir_entry in fs::read_dir(&content_dir)? {
                let clump_dir = dir_entry?.path();
                if !clump_dir.is_dir() {
                    continue;
                }

                let clump_id = file_name_of(&clump_dir);
                self.create_clump(&clump_id)?;

                let mut binaries = Vec::new();
                for dir_entry in fs::read_dir(&clump_dir)? {
                    let file_path = dir_entry?.path();
                    if file_name_of(&file_path).ends_with(LOG_SUFFIX) {
                        binaries.push(fs::read(&file_path)?);
                    }
                }

                self.import_binaries(&binaries, &Options::default().clump_id(&clump_id))?;
            }
        }

        debug!("Imported spool from {}", path.display());
        Ok(())
    }

    /// Ingests concatenated entry binaries into the addressed clump.
    ///
    /// Each binary is split into entries which are then stored one by one: blocked content is
    /// refused, existing records are kept unless `options.replace` is set, everything else is
    /// validated and persisted. Returns the stored entries.
    pub fn import_binaries(
        &self,
        binaries: &[Vec<u8>],
        options: &Options,
    ) -> Result<Vec<Entry>, InterchangeError> {
        let mut stored = Vec::new();

        for bytes in binaries {
            let entries =
                decode_stream(bytes).map_err(|err| InterchangeError::BadBinary(err.to_string()))?;

            for entry in entries {
                stored.push(self.store_entry(&entry, options)?);
            }
        }

        Ok(stored)
    }

    /// Re-creates one identity from its keyfile.
    fn import_keyfile(&self, file_path: &Path) -> Result<(), InterchangeError> {
        let name = file_path.display().to_string();

        let keyfile: Keyfile = serde_json::from_str(&fs::read_to_string(file_path)?)
            .map_err(|err| InterchangeError::BadKeyfile(name.clone(), err.to_string()))?;

        // Cross-check that the recorded public key derives from the recorded secret before
        // anything is written
        let decoded = crate::base62::decode(&keyfile.secret_key)
            .map_err(|err| InterchangeError::BadKeyfile(name.clone(), err.to_string()))?;
        if decoded.len() > SECRET_KEY_LENGTH {
            return Err(InterchangeError::BadKeyfile(
                name,
                "secret key too long".to_owned(),
            ));
        }

        let mut secret = vec![0u8; SECRET_KEY_LENGTH - decoded.len()];
        secret.extend_from_slice(&decoded);

        let key_pair = KeyPair::from_private_key_bytes(&secret)
            .map_err(|err| InterchangeError::BadKeyfile(name.clone(), err.to_string()))?;

        if key_pair.author().as_str() != keyfile.public_key {
            return Err(InterchangeError::KeyfileMismatch(name));
        }

        self.create_identity(&keyfile.identity, Some(&secret))?;
        Ok(())
    }
}

/// Final path component as owned string, empty when the path has none.
fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use crate::engine::{Baobab, EngineError, Options, DEFAULT_CLUMP};
    use crate::interchange::InterchangeError;
    use crate::store::{BlockSpec, StatusKind};
    use crate::test_utils::fixtures::{append_many, engine};

    #[rstest]
    fn export_import_round_trip(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        baobab.create_identity("testy", None).unwrap();
        append_many(&baobab, "testy", 14);

        let content_hash = baobab
            .current_hash(StatusKind::Content, DEFAULT_CLUMP)
            .unwrap();

        let bundle = TempDir::new().unwrap();
        baobab.export(bundle.path()).unwrap();

        // Wipe the content table, then restore it from the bundle
        baobab.purge(None, None, DEFAULT_CLUMP).unwrap();
        assert_eq!(baobab.max_seq_num("testy", &Options::default()).unwrap(), 0);

        baobab.import(bundle.path()).unwrap();

        assert_eq!(
            baobab.max_seq_num("testy", &Options::default()).unwrap(),
            14
        );
        for seq_num in 1..=14 {
            assert!(baobab
                .log_entry(
                    "testy",
                    Some(seq_num),
                    &Options::default().revalidate(true)
                )
                .is_ok());
        }

        // The restored table carries the digest of the original
        assert_eq!(
            baobab
                .current_hash(StatusKind::Content, DEFAULT_CLUMP)
                .unwrap(),
            content_hash
        );
    }

    #[rstest]
    fn import_into_fresh_spool(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        baobab.create_identity("testy", None).unwrap();
        baobab.create_clump("garden").unwrap();
        append_many(&baobab, "testy", 3);
        baobab
            .append(b"in the garden", "testy", &Options::default().clump_id("garden"))
            .unwrap();

        let bundle = TempDir::new().unwrap();
        baobab.export(bundle.path()).unwrap();

        // A fresh spool learns identities, clumps and content from the bundle
        let fresh_dir = TempDir::new().unwrap();
        let fresh = Baobab::open(fresh_dir.path()).unwrap();
        fresh.import(bundle.path()).unwrap();

        assert_eq!(fresh.identities(), baobab.identities());
        assert_eq!(fresh.clumps(), baobab.clumps());
        assert_eq!(fresh.max_seq_num("testy", &Options::default()).unwrap(), 3);
        assert_eq!(
            fresh
                .max_seq_num("testy", &Options::default().clump_id("garden"))
                .unwrap(),
            1
        );
    }

    #[rstest]
    fn import_binaries_accepts_partial_logs(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        baobab.create_identity("testy", None).unwrap();
        append_many(&baobab, "testy", 14);
        baobab.compact("testy", &Options::default()).unwrap();

        // Export only the certificate pool of the tip, import into a fresh spool: the missing
        // backlink targets are tolerated
        let bundle = TempDir::new().unwrap();
        baobab.export(bundle.path()).unwrap();

        let fresh_dir = TempDir::new().unwrap();
        let fresh = Baobab::open(fresh_dir.path()).unwrap();
        fresh.import(bundle.path()).unwrap();

        assert_eq!(
            fresh.all_seq_nums("testy", &Options::default()).unwrap(),
            vec![1, 4, 13, 14]
        );
        assert!(fresh
            .log_entry("testy", Some(14), &Options::default().revalidate(true))
            .is_ok());
    }

    #[rstest]
    fn import_refuses_blocked_content(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        let author = baobab.create_identity("foreign", None).unwrap();
        append_many(&baobab, "foreign", 2);

        let bundle = TempDir::new().unwrap();
        baobab.export(bundle.path()).unwrap();

        let fresh_dir = TempDir::new().unwrap();
        let fresh = Baobab::open(fresh_dir.path()).unwrap();
        fresh
            .block(
                &BlockSpec::Author(author.as_str().to_owned()),
                DEFAULT_CLUMP,
            )
            .unwrap();

        assert!(matches!(
            fresh.import(bundle.path()),
            Err(InterchangeError::EngineError(EngineError::RefusedBlocked))
        ));
    }

    #[rstest]
    fn keyfile_mismatch_is_rejected(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        baobab.create_identity("testy", None).unwrap();
        baobab.create_identity("other", None).unwrap();

        let bundle = TempDir::new().unwrap();
        baobab.export(bundle.path()).unwrap();

        // Swap the recorded public key for another identity's
        let keyfile_path = bundle
            .path()
            .join("identities")
            .join("testy.keyfile.json");
        let mut keyfile: crate::interchange::Keyfile =
            serde_json::from_str(&std::fs::read_to_string(&keyfile_path).unwrap()).unwrap();
        keyfile.public_key = baobab
            .resolve_author("other")
            .unwrap()
            .as_str()
            .to_owned();
        std::fs::write(&keyfile_path, serde_json::to_string(&keyfile).unwrap()).unwrap();

        let fresh_dir = TempDir::new().unwrap();
        let fresh = Baobab::open(fresh_dir.path()).unwrap();
        assert!(matches!(
            fresh.import(bundle.path()),
            Err(InterchangeError::KeyfileMismatch(_))
        ));
    }

    #[rstest]
    fn import_binaries_keeps_existing_records(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;
        baobab.create_identity("testy", None).unwrap();
        let entries = append_many(&baobab, "testy", 2);

        let binary = baobab
            .log_entry_binary("testy", Some(2), &Options::default())
            .unwrap();

        // Without replace the existing record is returned untouched
        let stored = baobab
            .import_binaries(&[binary.clone()], &Options::default())
            .unwrap();
        assert_eq!(stored, vec![entries[1].clone()]);

        // With replace it is validated and written again
        let stored = baobab
            .import_binaries(&[binary], &Options::default().replace(true))
            .unwrap();
        assert_eq!(stored, vec![entries[1].clone()]);
    }

    #[rstest]
    fn malformed_binaries_are_reported(engine: (TempDir, Baobab)) {
        let (_dir, baobab) = engine;

        assert!(matches!(
            baobab.import_binaries(&[vec![0u8; 12]], &Options::default()),
            Err(InterchangeError::BadBinary(_))
        ));
    }
}
