// SPDX-License-Identifier: AGPL-3.0-or-later

//! Base62 text encoding of binary values.
//!
//! Public keys, secret keys and status digests travel as base62 strings; a 32 byte key encodes
//! to 43 characters. The encoding is positional over the full value, leading zero bytes do not
//! lengthen the text.
use thiserror::Error;

/// Alphabet of the base62 encoding, digits first.
const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Error returned for text outside the base62 alphabet.
#[derive(Error, Debug, Clone, Copy)]
#[error("invalid base62 encoding")]
pub struct Base62Error;

/// Encodes bytes as base62 text.
pub fn encode(bytes: &[u8]) -> String {
    base_x::encode(ALPHABET, bytes)
}

/// Decodes base62 text into bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, Base62Error> {
    base_x::decode(ALPHABET, text).map_err(|_| Base62Error)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};

    #[test]
    fn round_trip() {
        let bytes: Vec<u8> = (1..=32).collect();
        let text = encode(&bytes);
        assert_eq!(decode(&text).unwrap(), bytes);
    }

    #[test]
    fn public_key_width() {
        // A key with a high first byte uses the full 43 characters
        let text = encode(&[0xffu8; 32]);
        assert_eq!(text.len(), 43);
    }

    #[test]
    fn rejects_foreign_characters() {
        assert!(decode("not base62!").is_err());
        assert!(decode("abcDEF123").is_ok());
    }
}
