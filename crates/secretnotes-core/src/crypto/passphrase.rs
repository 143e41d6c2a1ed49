//! Passphrase handling and validation.
//!
//! The minimum length is a deployment policy, not a property of the
//! encryption engine. Front-ends build a [`PassphrasePolicy`] from their
//! configuration and apply it before any store access.

use std::fmt;

use secrecy::{ExposeSecret, SecretSlice};

use crate::error::{NotesError, Result};

/// Default minimum passphrase length in bytes.
pub const DEFAULT_MIN_PASSPHRASE_LENGTH: usize = 3;

/// Minimum length used by hardened deployments.
pub const STRICT_MIN_PASSPHRASE_LENGTH: usize = 32;

/// A passphrase held in a zeroize-on-drop buffer.
///
/// The bytes are wiped when the value is dropped. `Debug` never prints them.
pub struct Passphrase(SecretSlice<u8>);

impl Passphrase {
    /// Take ownership of passphrase bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(SecretSlice::from(bytes.into()))
    }

    /// Borrow the raw bytes for an immediate cryptographic operation.
    ///
    /// # Security
    ///
    /// Avoid copying or logging this value.
    pub fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.expose().len()
    }

    /// Whether the passphrase is empty.
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<&str> for Passphrase {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes().to_vec())
    }
}

impl From<String> for Passphrase {
    fn from(value: String) -> Self {
        Self::new(value.into_bytes())
    }
}

impl From<Vec<u8>> for Passphrase {
    fn from(value: Vec<u8>) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Passphrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Passphrase").field(&"[REDACTED]").finish()
    }
}

/// Minimum-length policy for passphrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassphrasePolicy {
    min_length: usize,
}

impl PassphrasePolicy {
    /// Create a policy with the given minimum byte length.
    ///
    /// A minimum of zero is raised to one; empty passphrases are never accepted.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(1),
        }
    }

    /// Hardened policy (32 bytes).
    pub fn strict() -> Self {
        Self::new(STRICT_MIN_PASSPHRASE_LENGTH)
    }

    /// Configured minimum length in bytes.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Validate a passphrase against this policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use secretnotes_core::crypto::{Passphrase, PassphrasePolicy};
    ///
    /// let policy = PassphrasePolicy::default();
    /// assert!(policy.validate(&Passphrase::from("abc")).is_ok());
    /// assert!(policy.validate(&Passphrase::from("ab")).is_err());
    /// ```
    pub fn validate(&self, passphrase: &Passphrase) -> Result<()> {
        if passphrase.len() < self.min_length {
            return Err(NotesError::PassphraseTooShort {
                min: self.min_length,
                actual: passphrase.len(),
            });
        }
        Ok(())
    }
}

impl Default for PassphrasePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSPHRASE_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_accepts_three_bytes() {
        let policy = PassphrasePolicy::default();
        assert!(policy.validate(&Passphrase::from("abc")).is_ok());
    }

    #[test]
    fn test_default_policy_rejects_short() {
        let policy = PassphrasePolicy::default();
        let result = policy.validate(&Passphrase::from("ab"));
        assert!(matches!(
            result,
            Err(NotesError::PassphraseTooShort { min: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_strict_policy() {
        let policy = PassphrasePolicy::strict();
        assert!(policy.validate(&Passphrase::from("short-but-not-32")).is_err());
        assert!(policy
            .validate(&Passphrase::from("this_is_a_very_long_passphrase_of_32+"))
            .is_ok());
    }

    #[test]
    fn test_zero_minimum_still_rejects_empty() {
        let policy = PassphrasePolicy::new(0);
        assert_eq!(policy.min_length(), 1);
        assert!(policy.validate(&Passphrase::from("")).is_err());
    }

    #[test]
    fn test_length_is_bytes_not_chars() {
        // "é" is two bytes in UTF-8
        let passphrase = Passphrase::from("é");
        assert_eq!(passphrase.len(), 2);
        assert!(PassphrasePolicy::new(2).validate(&passphrase).is_ok());
    }

    #[test]
    fn test_debug_redacts() {
        let passphrase = Passphrase::from("hunter2-secret");
        let debug_output = format!("{:?}", passphrase);
        assert!(debug_output.contains("REDACTED"));
        assert!(!debug_output.contains("hunter2"));
    }
}
