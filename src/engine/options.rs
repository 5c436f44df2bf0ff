// SPDX-License-Identifier: AGPL-3.0-or-later

use crate::engine::DEFAULT_CLUMP;

/// Caller options accepted by most engine operations.
///
/// The defaults address log 0 in the `"default"` clump, skip revalidation on reads and keep
/// existing records on imports.
#[derive(Clone, Debug)]
pub struct Options {
    /// Log of the addressed author.
    pub log_id: u64,

    /// Run full validation before returning retrieved entries.
    pub revalidate: bool,

    /// Replace existing records on import instead of keeping them.
    pub replace: bool,

    /// Clump addressed by the operation.
    pub clump_id: String,
}

impl Options {
    /// Returns the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log id.
    pub fn log_id(mut self, log_id: u64) -> Self {
        self.log_id = log_id;
        self
    }

    /// Requests full validation of retrieved entries.
    pub fn revalidate(mut self, revalidate: bool) -> Self {
        self.revalidate = revalidate;
        self
    }

    /// Requests replacement of existing records on import.
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Sets the addressed clump.
    pub fn clump_id(mut self, clump_id: &str) -> Self {
        self.clump_id = clump_id.to_owned();
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            log_id: 0,
            revalidate: false,
            replace: false,
            clump_id: DEFAULT_CLUMP.to_owned(),
        }
    }
}
