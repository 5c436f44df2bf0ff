// SPDX-License-Identifier: AGPL-3.0-or-later

use std::convert::TryFrom;
use std::fmt::Display;
use std::hash::Hash as StdHash;
use std::str::FromStr;

use lipmaa_link::{get_lipmaa_links_back_to, lipmaa};
use serde::{Deserialize, Serialize};

use crate::entry::error::SeqNumError;
use crate::Validate;

/// Start counting entries from here.
pub const FIRST_SEQ_NUM: u64 = 1;

/// Sequence number describing the position of an entry in its append-only log.
#[derive(Clone, Copy, Debug, Serialize, Eq, PartialEq, PartialOrd, Ord, StdHash, Deserialize)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Validates and wraps value into a new `SeqNum` instance.
    pub fn new(value: u64) -> Result<Self, SeqNumError> {
        let seq_num = Self(value);
        seq_num.validate()?;
        Ok(seq_num)
    }

    /// Return sequence number of the previous entry (backlink).
    pub fn backlink_seq_num(&self) -> Option<Self> {
        Self::new(self.0 - 1).ok()
    }

    /// Return sequence number of the lipmaa entry (lipmaalink) when one is demanded.
    ///
    /// See [Bamboo] specification for more details about how lipmaalinks are calculated.
    ///
    /// [Bamboo]: https://github.com/AljoschaMeyer/bamboo#links-and-entry-verification
    pub fn lipmaalink_seq_num(&self) -> Option<Self> {
        if self.is_lipmaalink_required() {
            Some(Self(lipmaa(self.0)))
        } else {
            None
        }
    }

    /// Returns true when a lipmaalink must be present on the entry at this sequence number.
    ///
    /// The lipmaalink is omitted whenever it would point at the same entry as the backlink.
    pub fn is_lipmaalink_required(&self) -> bool {
        lipmaa(self.0) != self.0 - 1
    }

    /// Returns the sequence numbers certifying this one, in descending order.
    ///
    /// The pool begins with this sequence number itself, follows the lipmaa links downwards and
    /// always ends at the first entry of the log.
    pub fn certificate_pool(&self) -> Vec<u64> {
        let mut pool = vec![self.0];

        if self.0 > FIRST_SEQ_NUM {
            for seq_num in get_lipmaa_links_back_to(self.0, FIRST_SEQ_NUM) {
                if seq_num >= FIRST_SEQ_NUM && pool.last() != Some(&seq_num) {
                    pool.push(seq_num);
                }
            }

            // Every pool reaches back to the first entry of the log
            if pool.last() != Some(&FIRST_SEQ_NUM) {
                pool.push(FIRST_SEQ_NUM);
            }
        }

        pool
    }

    /// Returns true when sequence number marks first entry in log.
    pub fn is_first(&self) -> bool {
        self.0 == FIRST_SEQ_NUM
    }

    /// Returns `SeqNum` as u64 integer.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self::new(FIRST_SEQ_NUM).unwrap()
    }
}

impl Validate for SeqNum {
    type Error = SeqNumError;

    fn validate(&self) -> Result<(), Self::Error> {
        // Numbers have to be larger than zero
        if self.0 < FIRST_SEQ_NUM {
            return Err(SeqNumError::NotZeroOrNegative);
        }

        Ok(())
    }
}

impl Iterator for SeqNum {
    type Item = SeqNum;

    fn next(&mut self) -> Option<Self::Item> {
        Some(Self(self.0 + 1))
    }
}

impl Display for SeqNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Convert any borrowed string representation of an u64 integer into an `SeqNum` instance.
impl FromStr for SeqNum {
    type Err = SeqNumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(u64::from_str(s).map_err(|_| SeqNumError::InvalidU64String)?)
    }
}

impl TryFrom<u64> for SeqNum {
    type Error = SeqNumError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::SeqNum;

    #[test]
    fn validate() {
        assert!(SeqNum::new(0).is_err());
        assert!(SeqNum::new(100).is_ok());
    }

    #[test]
    fn lipmaalink_seq_num() {
        assert_eq!(
            SeqNum::new(13).unwrap().lipmaalink_seq_num().unwrap(),
            SeqNum::new(4).unwrap()
        );

        // Lipmaalink is omitted when it equals the backlink
        assert!(SeqNum::new(2).unwrap().lipmaalink_seq_num().is_none());
        assert!(SeqNum::new(14).unwrap().lipmaalink_seq_num().is_none());
    }

    #[test]
    fn backlink_seq_num() {
        assert_eq!(
            SeqNum::new(12).unwrap().backlink_seq_num().unwrap(),
            SeqNum::new(11).unwrap()
        );

        assert!(SeqNum::new(1).unwrap().backlink_seq_num().is_none());
    }

    #[test]
    fn certificate_pool() {
        assert_eq!(SeqNum::new(1).unwrap().certificate_pool(), vec![1]);
        assert_eq!(SeqNum::new(2).unwrap().certificate_pool(), vec![2, 1]);
        assert_eq!(SeqNum::new(14).unwrap().certificate_pool(), vec![14, 13, 4, 1]);
    }
}
