// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt::Display;
use std::hash::Hash as StdHash;

use serde::{Deserialize, Serialize};

/// Authors can write entries to multiple logs identified by log ids.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq, PartialOrd, Ord, StdHash)]
pub struct LogId(u64);

impl LogId {
    /// Wraps a log id value into a new `LogId` instance.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns `LogId` as u64 integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::LogId;

    #[test]
    fn log_ids() {
        assert_eq!(LogId::default(), LogId::new(0));
        assert_eq!(LogId::new(7).as_u64(), 7);
        assert_ne!(LogId::new(1), LogId::new(2));
    }
}
