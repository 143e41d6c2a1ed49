//! Envelope layouts.
//!
//! Legacy envelope (format 0), bit-exact with existing stored data:
//!
//! | Offset | Size | Field                    |
//! |--------|------|--------------------------|
//! | 0      | 16   | salt                     |
//! | 16     | 12   | nonce                    |
//! | 28     | N    | ciphertext + 16-byte tag |
//!
//! The KDF is implicitly PBKDF2-HMAC-SHA256 with 10 000 rounds.
//!
//! Versioned envelope (format 1), self-describing:
//!
//! | Offset | Size | Field                    |
//! |--------|------|--------------------------|
//! | 0      | 1    | version (0x01)           |
//! | 1      | 1    | kdf_id                   |
//! | 2      | 4    | param 1 (LE u32)         |
//! | 6      | 4    | param 2 (LE u32)         |
//! | 10     | 4    | param 3 (LE u32)         |
//! | 14     | 16   | salt                     |
//! | 30     | 12   | nonce                    |
//! | 42     | N    | ciphertext + 16-byte tag |
//!
//! `kdf_id` 0x01 is Argon2id (memory KiB, iterations, parallelism);
//! 0x02 is PBKDF2-HMAC-SHA256 (rounds, 0, 0). The 42 header bytes are
//! authenticated as AEAD associated data.
//!
//! A legacy envelope starts with random salt bytes, so the two layouts
//! cannot be told apart from the bytes alone. Callers record the
//! [`EnvelopeFormat`] next to every envelope they store.

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::KdfParams;
use crate::error::{NotesError, Result};

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-256-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;
/// AES-256-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// Minimum legacy envelope: salt + nonce + tag = 44.
pub const MIN_LEGACY_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

const VERSION_V1: u8 = 0x01;
const KDF_ARGON2ID: u8 = 0x01;
const KDF_PBKDF2_SHA256: u8 = 0x02;
const PARAMS_OFFSET: usize = 2;
const SALT_OFFSET: usize = 14;
const NONCE_OFFSET: usize = SALT_OFFSET + SALT_LEN;

/// Versioned header size: version(1) + kdf(1) + params(12) + salt(16) + nonce(12) = 42.
pub const VERSIONED_HEADER_LEN: usize = NONCE_OFFSET + NONCE_LEN;

/// Minimum versioned envelope: header + tag = 58.
pub const MIN_VERSIONED_ENVELOPE_LEN: usize = VERSIONED_HEADER_LEN + TAG_LEN;

/// Which envelope layout a stored blob uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeFormat {
    /// `salt ‖ nonce ‖ ciphertext+tag`, PBKDF2 with fixed rounds.
    Legacy,
    /// Version byte and KDF parameters precede salt and nonce.
    Versioned,
}

impl EnvelopeFormat {
    /// Numeric version persisted alongside stored envelopes.
    pub fn version(&self) -> u8 {
        match self {
            EnvelopeFormat::Legacy => 0,
            EnvelopeFormat::Versioned => VERSION_V1,
        }
    }

    /// Resolve a persisted version number.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::MalformedEnvelope` for unknown versions.
    pub fn from_version(version: i64) -> Result<Self> {
        match version {
            0 => Ok(EnvelopeFormat::Legacy),
            1 => Ok(EnvelopeFormat::Versioned),
            other => Err(NotesError::MalformedEnvelope(format!(
                "Unsupported envelope version: {}",
                other
            ))),
        }
    }

    /// Smallest well-formed envelope for this layout.
    pub fn min_len(&self) -> usize {
        match self {
            EnvelopeFormat::Legacy => MIN_LEGACY_ENVELOPE_LEN,
            EnvelopeFormat::Versioned => MIN_VERSIONED_ENVELOPE_LEN,
        }
    }

    /// Bytes an envelope of this layout adds on top of the plaintext.
    pub fn overhead(&self) -> usize {
        self.min_len()
    }
}

/// Borrowed view of an envelope's fields.
#[derive(Debug)]
pub struct EnvelopeParts<'a> {
    /// KDF used to derive the envelope key.
    pub kdf: KdfParams,
    /// Per-envelope KDF salt.
    pub salt: &'a [u8; SALT_LEN],
    /// AEAD nonce.
    pub nonce: &'a [u8; NONCE_LEN],
    /// Bytes authenticated as associated data (empty for legacy envelopes).
    pub aad: &'a [u8],
    /// Ciphertext with the trailing authentication tag.
    pub ciphertext: &'a [u8],
}

/// Split a legacy envelope into its fields.
///
/// # Errors
///
/// Returns `NotesError::MalformedEnvelope` if the envelope is shorter than
/// salt + nonce + tag.
pub fn split_legacy(envelope: &[u8]) -> Result<EnvelopeParts<'_>> {
    if envelope.len() < MIN_LEGACY_ENVELOPE_LEN {
        return Err(too_short(envelope.len(), MIN_LEGACY_ENVELOPE_LEN));
    }

    let (salt, rest) = envelope.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    Ok(EnvelopeParts {
        kdf: KdfParams::legacy(),
        salt: fixed(salt)?,
        nonce: fixed(nonce)?,
        aad: &[],
        ciphertext,
    })
}

/// Split a versioned envelope into its fields.
///
/// # Errors
///
/// Returns `NotesError::MalformedEnvelope` if the envelope is too short or
/// names an unknown version or KDF.
pub fn split_versioned(envelope: &[u8]) -> Result<EnvelopeParts<'_>> {
    if envelope.len() < MIN_VERSIONED_ENVELOPE_LEN {
        return Err(too_short(envelope.len(), MIN_VERSIONED_ENVELOPE_LEN));
    }
    if envelope[0] != VERSION_V1 {
        return Err(NotesError::MalformedEnvelope(format!(
            "Unsupported envelope version: {}",
            envelope[0]
        )));
    }

    let p1 = read_u32(envelope, PARAMS_OFFSET)?;
    let p2 = read_u32(envelope, PARAMS_OFFSET + 4)?;
    let p3 = read_u32(envelope, PARAMS_OFFSET + 8)?;
    let kdf = match envelope[1] {
        KDF_ARGON2ID => KdfParams::Argon2id {
            memory_kib: p1,
            iterations: p2,
            parallelism: p3,
        },
        KDF_PBKDF2_SHA256 => {
            if p2 != 0 || p3 != 0 {
                return Err(NotesError::MalformedEnvelope(
                    "PBKDF2 header has non-zero reserved parameters".to_string(),
                ));
            }
            KdfParams::Pbkdf2Sha256 { rounds: p1 }
        }
        other => {
            return Err(NotesError::MalformedEnvelope(format!(
                "Unsupported KDF id: {:#04x}",
                other
            )))
        }
    };

    let (aad, ciphertext) = envelope.split_at(VERSIONED_HEADER_LEN);

    Ok(EnvelopeParts {
        kdf,
        salt: fixed(&envelope[SALT_OFFSET..NONCE_OFFSET])?,
        nonce: fixed(&envelope[NONCE_OFFSET..VERSIONED_HEADER_LEN])?,
        aad,
        ciphertext,
    })
}

/// Build the 42-byte versioned header.
pub fn versioned_header(
    kdf: &KdfParams,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
) -> [u8; VERSIONED_HEADER_LEN] {
    let (kdf_id, params) = match *kdf {
        KdfParams::Argon2id {
            memory_kib,
            iterations,
            parallelism,
        } => (KDF_ARGON2ID, [memory_kib, iterations, parallelism]),
        KdfParams::Pbkdf2Sha256 { rounds } => (KDF_PBKDF2_SHA256, [rounds, 0, 0]),
    };

    let mut header = [0u8; VERSIONED_HEADER_LEN];
    header[0] = VERSION_V1;
    header[1] = kdf_id;
    for (i, value) in params.iter().enumerate() {
        let start = PARAMS_OFFSET + i * 4;
        header[start..start + 4].copy_from_slice(&value.to_le_bytes());
    }
    header[SALT_OFFSET..NONCE_OFFSET].copy_from_slice(salt);
    header[NONCE_OFFSET..].copy_from_slice(nonce);
    header
}

fn too_short(actual: usize, min: usize) -> NotesError {
    NotesError::MalformedEnvelope(format!(
        "Envelope too short: {} bytes (minimum {})",
        actual, min
    ))
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<&[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| NotesError::MalformedEnvelope("Envelope field has wrong length".to_string()))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let field: &[u8; 4] = fixed(&bytes[offset..offset + 4])?;
    Ok(u32::from_le_bytes(*field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_versioned(kdf: &KdfParams) -> Vec<u8> {
        let header = versioned_header(kdf, &[0xAA; SALT_LEN], &[0xBB; NONCE_LEN]);
        let mut raw = header.to_vec();
        raw.extend_from_slice(&[0xCC; TAG_LEN + 4]);
        raw
    }

    #[test]
    fn test_layout_sizes() {
        assert_eq!(MIN_LEGACY_ENVELOPE_LEN, 44);
        assert_eq!(VERSIONED_HEADER_LEN, 42);
        assert_eq!(MIN_VERSIONED_ENVELOPE_LEN, 58);
    }

    #[test]
    fn test_split_legacy_fields() {
        let mut raw = vec![0x11; SALT_LEN];
        raw.extend_from_slice(&[0x22; NONCE_LEN]);
        raw.extend_from_slice(&[0x33; TAG_LEN]);

        let parts = split_legacy(&raw).unwrap();
        assert_eq!(parts.salt, &[0x11; SALT_LEN]);
        assert_eq!(parts.nonce, &[0x22; NONCE_LEN]);
        assert_eq!(parts.ciphertext, &[0x33; TAG_LEN]);
        assert!(parts.aad.is_empty());
        assert_eq!(parts.kdf, KdfParams::legacy());
    }

    #[test]
    fn test_split_legacy_rejects_short() {
        let result = split_legacy(&[0u8; MIN_LEGACY_ENVELOPE_LEN - 1]);
        assert!(matches!(result, Err(NotesError::MalformedEnvelope(_))));
        assert!(split_legacy(&[]).is_err());
    }

    #[test]
    fn test_versioned_header_parses_back() {
        let kdf = KdfParams::Argon2id {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        };
        let raw = sample_versioned(&kdf);

        let parts = split_versioned(&raw).unwrap();
        assert_eq!(parts.kdf, kdf);
        assert_eq!(parts.salt, &[0xAA; SALT_LEN]);
        assert_eq!(parts.nonce, &[0xBB; NONCE_LEN]);
        assert_eq!(parts.aad.len(), VERSIONED_HEADER_LEN);
        assert_eq!(parts.ciphertext.len(), TAG_LEN + 4);
    }

    #[test]
    fn test_versioned_pbkdf2_header() {
        let raw = sample_versioned(&KdfParams::Pbkdf2Sha256 { rounds: 600_000 });
        assert_eq!(raw[1], KDF_PBKDF2_SHA256);
        assert_eq!(&raw[2..6], &600_000u32.to_le_bytes());

        let parts = split_versioned(&raw).unwrap();
        assert_eq!(parts.kdf, KdfParams::Pbkdf2Sha256 { rounds: 600_000 });
    }

    #[test]
    fn test_split_versioned_rejects_wrong_version() {
        let mut raw = sample_versioned(&KdfParams::argon2id());
        raw[0] = 0x02;
        assert!(matches!(
            split_versioned(&raw),
            Err(NotesError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_split_versioned_rejects_unknown_kdf() {
        let mut raw = sample_versioned(&KdfParams::argon2id());
        raw[1] = 0x7F;
        assert!(matches!(
            split_versioned(&raw),
            Err(NotesError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_split_versioned_rejects_reserved_pbkdf2_params() {
        let mut raw = sample_versioned(&KdfParams::legacy());
        raw[6] = 1;
        assert!(split_versioned(&raw).is_err());
    }

    #[test]
    fn test_split_versioned_rejects_short() {
        let result = split_versioned(&[VERSION_V1; MIN_VERSIONED_ENVELOPE_LEN - 1]);
        assert!(matches!(result, Err(NotesError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_format_versions() {
        assert_eq!(EnvelopeFormat::Legacy.version(), 0);
        assert_eq!(EnvelopeFormat::Versioned.version(), 1);
        assert_eq!(EnvelopeFormat::from_version(0).unwrap(), EnvelopeFormat::Legacy);
        assert_eq!(
            EnvelopeFormat::from_version(1).unwrap(),
            EnvelopeFormat::Versioned
        );
        assert!(EnvelopeFormat::from_version(9).is_err());
    }
}
