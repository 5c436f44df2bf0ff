// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fs;
use std::path::Path;

use ::log::debug;

use crate::engine::{Baobab, Options};
use crate::interchange::{InterchangeError, Keyfile, KEYFILE_SUFFIX, LOG_SUFFIX};
use crate::store::KeyPart;

impl Baobab {
    /// Exports all identities and all stored content into a directory tree.
    ///
    /// Keyfiles carry secret key material and are written with mode 0600; content directories
    /// and log files are written with mode 0700.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), InterchangeError> {
        let path = path.as_ref();

        let identities_dir = path.join("identities");
        fs::create_dir_all(&identities_dir)?;

        for (alias, author) in self.identities() {
            let secret = self.identity_key(&alias, KeyPart::Secret)?;
            let keyfile = Keyfile::new(&alias, author.as_str(), &crate::base62::encode(&secret));

            let file_path = identities_dir.join(format!("{}{}", alias, KEYFILE_SUFFIX));
            fs::write(&file_path, serde_json::to_string_pretty(&keyfile)?)?;
            set_mode(&file_path, 0o600)?;
        }

        let content_dir = path.join("content");
        fs::create_dir_all(&content_dir)?;
        set_mode(&content_dir, 0o700)?;

        for clump_id in self.clumps() {
            let clump_dir = content_dir.join(&clump_id);
            fs::create_dir_all(&clump_dir)?;
            set_mode(&clump_dir, 0o700)?;

            for (author, log_id, _) in self.stored_info(&clump_id)? {
                let options = Options::default().log_id(log_id).clump_id(&clump_id);

                let mut bytes = Vec::new();
                for seq_num in self.all_seq_nums(&author, &options)? {
                    bytes.extend(self.log_entry_binary(&author, Some(seq_num), &options)?);
                }

                let file_path = clump_dir.join(format!("{}_{}{}", author, log_id, LOG_SUFFIX));
                fs::write(&file_path, bytes)?;
                set_mode(&file_path, 0o700)?;
            }
        }

        debug!("Exported spool to {}", path.display());
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(mode);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
