//! Key derivation from passphrases.
//!
//! Two KDFs are supported:
//! - **PBKDF2-HMAC-SHA256** with a fixed 10 000 rounds, used by legacy
//!   envelopes. The round count is not stored in a legacy envelope, so
//!   [`LEGACY_PBKDF2_ROUNDS`] can never change without making existing
//!   data undecryptable.
//! - **Argon2id**, memory-hard, used by versioned envelopes which record
//!   their parameters in the header.

use argon2::Argon2;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::ZeroizeOnDrop;

use crate::crypto::envelope::SALT_LEN;
use crate::error::{NotesError, Result};

/// Length of a derived key in bytes (256 bits for AES-256-GCM).
pub const KEY_LEN: usize = 32;

/// PBKDF2 round count for legacy envelopes.
pub const LEGACY_PBKDF2_ROUNDS: u32 = 10_000;

const MIN_PBKDF2_ROUNDS: u32 = 10_000;
const MAX_PBKDF2_ROUNDS: u32 = 10_000_000;

// Upper bounds apply to parameters read from untrusted envelope headers.
const MAX_ARGON2_MEMORY_KIB: u32 = 256 * 1024;
const MAX_ARGON2_ITERATIONS: u32 = 10;
const MAX_ARGON2_PARALLELISM: u32 = 8;

/// Argon2id defaults: 64 MiB, 3 iterations, single lane.
const ARGON2_MEMORY_KIB: u32 = 64 * 1024;
const ARGON2_ITERATIONS: u32 = 3;
const ARGON2_PARALLELISM: u32 = 1;

/// Key derivation algorithm and its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum KdfParams {
    /// PBKDF2 with HMAC-SHA256.
    Pbkdf2Sha256 { rounds: u32 },
    /// Argon2id (v0x13).
    Argon2id {
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl KdfParams {
    /// Parameters implied by every legacy envelope.
    pub const fn legacy() -> Self {
        KdfParams::Pbkdf2Sha256 {
            rounds: LEGACY_PBKDF2_ROUNDS,
        }
    }

    /// Recommended Argon2id parameters for new versioned envelopes.
    pub const fn argon2id() -> Self {
        KdfParams::Argon2id {
            memory_kib: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }

    /// Short algorithm name for logs and status output.
    pub fn algorithm(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            KdfParams::Argon2id { .. } => "argon2id",
        }
    }

    /// Check parameters are within the accepted bounds.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::KeyDerivation` for out-of-range parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            KdfParams::Pbkdf2Sha256 { rounds } => {
                if !(MIN_PBKDF2_ROUNDS..=MAX_PBKDF2_ROUNDS).contains(&rounds) {
                    return Err(NotesError::KeyDerivation(format!(
                        "PBKDF2 rounds must be between {} and {} (got {})",
                        MIN_PBKDF2_ROUNDS, MAX_PBKDF2_ROUNDS, rounds
                    )));
                }
            }
            KdfParams::Argon2id {
                memory_kib,
                iterations,
                parallelism,
            } => {
                if memory_kib > MAX_ARGON2_MEMORY_KIB
                    || iterations > MAX_ARGON2_ITERATIONS
                    || parallelism > MAX_ARGON2_PARALLELISM
                {
                    return Err(NotesError::KeyDerivation(
                        "Argon2id parameters exceed accepted limits".to_string(),
                    ));
                }
                argon2::Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN))
                    .map_err(|e| {
                        NotesError::KeyDerivation(format!("Invalid Argon2 params: {}", e))
                    })?;
            }
        }
        Ok(())
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::legacy()
    }
}

/// A cryptographic key derived from a passphrase.
///
/// Key material is zeroized from memory when dropped.
#[derive(Clone, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_LEN],
}

impl DerivedKey {
    pub(crate) fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { key: bytes }
    }

    /// Get a reference to the raw key bytes.
    ///
    /// # Security
    ///
    /// Avoid storing or logging this value. Use only for immediate encryption operations.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Derive a 32-byte envelope key from a passphrase and salt.
///
/// Same passphrase, salt and parameters always produce the same key.
/// The key is never cached; callers re-derive for every envelope.
///
/// # Errors
///
/// Returns `NotesError::KeyDerivation` if the parameters are invalid or the
/// underlying KDF fails.
pub fn derive_key(passphrase: &[u8], salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<DerivedKey> {
    params.validate()?;

    let mut key_bytes = [0u8; KEY_LEN];
    match *params {
        KdfParams::Pbkdf2Sha256 { rounds } => {
            pbkdf2::pbkdf2_hmac::<Sha256>(passphrase, salt, rounds, &mut key_bytes);
        }
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => {
            let argon2_params =
                argon2::Params::new(memory_kib, iterations, parallelism, Some(KEY_LEN))
                    .map_err(|e| {
                        NotesError::KeyDerivation(format!("Invalid Argon2 params: {}", e))
                    })?;
            let argon2 = Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                argon2_params,
            );
            argon2
                .hash_password_into(passphrase, salt, &mut key_bytes)
                .map_err(|e| NotesError::KeyDerivation(format!("Argon2id failed: {}", e)))?;
        }
    }

    Ok(DerivedKey::from_bytes(key_bytes))
}
