//! Lookup token derivation.
//!
//! A lookup token is the SHA-256 digest of the passphrase. It indexes
//! records without the store ever holding the passphrase. Derivation is
//! deliberately fast: brute-force resistance lives in the envelope KDF,
//! not here.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::{NotesError, Result};

/// Length of a lookup token in bytes.
pub const LOOKUP_TOKEN_LEN: usize = 32;

/// Deterministic, irreversible index key derived from a passphrase.
///
/// Not a secret: it may be stored, compared and logged.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LookupToken([u8; LOOKUP_TOKEN_LEN]);

impl LookupToken {
    /// Wrap raw digest bytes.
    pub const fn from_bytes(bytes: [u8; LOOKUP_TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; LOOKUP_TOKEN_LEN] {
        &self.0
    }

    /// Lowercase hex encoding (64 characters), as persisted by the store.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex token.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::InvalidInput` if the string is not valid hex or
    /// does not decode to exactly 32 bytes.
    pub fn from_hex(value: &str) -> Result<Self> {
        let decoded = hex::decode(value.trim())
            .map_err(|e| NotesError::InvalidInput(format!("Invalid lookup token hex: {}", e)))?;
        let bytes: [u8; LOOKUP_TOKEN_LEN] = decoded.try_into().map_err(|v: Vec<u8>| {
            NotesError::InvalidInput(format!(
                "Lookup token must be {} bytes (got {})",
                LOOKUP_TOKEN_LEN,
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for LookupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for LookupToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LookupToken").field(&self.to_hex()).finish()
    }
}

impl Serialize for LookupToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for LookupToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        LookupToken::from_hex(&value).map_err(serde::de::Error::custom)
    }
}

/// Derive the lookup token for a passphrase.
///
/// Total over all byte sequences; identical inputs always give identical
/// tokens.
///
/// # Examples
///
/// ```
/// use secretnotes_core::crypto::derive_lookup_token;
///
/// let first = derive_lookup_token(b"abc");
/// let second = derive_lookup_token(b"abc");
/// assert_eq!(first, second);
/// ```
pub fn derive_lookup_token(passphrase: &[u8]) -> LookupToken {
    let digest = Sha256::digest(passphrase);
    let mut bytes = [0u8; LOOKUP_TOKEN_LEN];
    bytes.copy_from_slice(&digest);
    LookupToken(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    // FIPS 180-2 test vector for SHA-256("abc")
    const ABC_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn test_token_is_deterministic() {
        let first = derive_lookup_token(b"abc");
        let second = derive_lookup_token(b"abc");
        assert_eq!(first, second);
        assert_eq!(first.as_bytes().len(), LOOKUP_TOKEN_LEN);
    }

    #[test]
    fn test_token_matches_sha256_vector() {
        assert_eq!(derive_lookup_token(b"abc").to_hex(), ABC_DIGEST);
    }

    #[test]
    fn test_different_passphrases_different_tokens() {
        assert_ne!(derive_lookup_token(b"alpha"), derive_lookup_token(b"beta"));
    }

    #[test]
    fn test_hex_round_trip() {
        let token = derive_lookup_token(b"correct-horse-battery-staple");
        let parsed = LookupToken::from_hex(&token.to_hex()).unwrap();
        assert_eq!(parsed, token);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        let result = LookupToken::from_hex("abcd");
        assert!(matches!(result, Err(NotesError::InvalidInput(_))));
    }

    #[test]
    fn test_from_hex_rejects_non_hex() {
        let result = LookupToken::from_hex(&"zz".repeat(32));
        assert!(matches!(result, Err(NotesError::InvalidInput(_))));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let token = derive_lookup_token(b"abc");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, format!("\"{}\"", ABC_DIGEST));

        let back: LookupToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
