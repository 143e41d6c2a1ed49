//! AES-256-GCM envelope encryption.
//!
//! Every call draws a fresh salt and nonce, re-derives the key from the
//! passphrase and returns a self-contained envelope. Nothing is cached
//! between calls, so all functions here are safe to call concurrently.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::crypto::envelope::{
    split_legacy, split_versioned, versioned_header, EnvelopeFormat, EnvelopeParts, NONCE_LEN,
    SALT_LEN,
};
use crate::crypto::kdf::{derive_key, KdfParams};
use crate::crypto::random::random_bytes;
use crate::error::{NotesError, Result};

/// Envelope layout and KDF used for new writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFormat {
    /// Legacy layout, PBKDF2-HMAC-SHA256 with the fixed round count.
    #[default]
    Legacy,
    /// Versioned layout with the given KDF recorded in the header.
    Versioned(KdfParams),
}

impl WriteFormat {
    /// Layout tag to persist next to envelopes written with this format.
    pub fn format(&self) -> EnvelopeFormat {
        match self {
            WriteFormat::Legacy => EnvelopeFormat::Legacy,
            WriteFormat::Versioned(_) => EnvelopeFormat::Versioned,
        }
    }
}

/// An envelope together with the layout it was written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub envelope: Vec<u8>,
    pub format: EnvelopeFormat,
}

/// Encrypt `plaintext` into a legacy envelope.
///
/// Output is `salt(16) ‖ nonce(12) ‖ ciphertext ‖ tag(16)`, so its length is
/// always `plaintext.len() + 44`.
///
/// # Errors
///
/// Returns `NotesError::RandomGeneration` if the OS cannot supply randomness.
///
/// # Examples
///
/// ```
/// use secretnotes_core::crypto::{decrypt, encrypt};
///
/// let envelope = encrypt(b"", b"any-passphrase").unwrap();
/// assert_eq!(envelope.len(), 44);
/// assert!(decrypt(&envelope, b"any-passphrase").unwrap().is_empty());
/// ```
pub fn encrypt(plaintext: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let salt: [u8; SALT_LEN] = random_bytes()?;
    let nonce: [u8; NONCE_LEN] = random_bytes()?;

    let ciphertext = seal_with(plaintext, passphrase, &KdfParams::legacy(), &salt, &nonce, &[])?;

    let mut envelope = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt a legacy envelope.
///
/// # Errors
///
/// - `NotesError::MalformedEnvelope` if the envelope is shorter than 44 bytes
/// - `NotesError::DecryptionFailed` for a wrong passphrase or any tampering
pub fn decrypt(envelope: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let parts = split_legacy(envelope)?;
    open_parts(&parts, passphrase)
}

/// Encrypt `plaintext` into a versioned envelope using `kdf`.
///
/// # Errors
///
/// - `NotesError::KeyDerivation` if `kdf` is out of bounds
/// - `NotesError::RandomGeneration` if the OS cannot supply randomness
pub fn encrypt_versioned(plaintext: &[u8], passphrase: &[u8], kdf: &KdfParams) -> Result<Vec<u8>> {
    kdf.validate()?;
    let salt: [u8; SALT_LEN] = random_bytes()?;
    let nonce: [u8; NONCE_LEN] = random_bytes()?;
    let header = versioned_header(kdf, &salt, &nonce);

    let ciphertext = seal_with(plaintext, passphrase, kdf, &salt, &nonce, &header)?;

    let mut envelope = Vec::with_capacity(header.len() + ciphertext.len());
    envelope.extend_from_slice(&header);
    envelope.extend_from_slice(&ciphertext);
    Ok(envelope)
}

/// Decrypt a versioned envelope, reading KDF parameters from its header.
///
/// # Errors
///
/// - `NotesError::MalformedEnvelope` for short envelopes or unknown version/KDF
/// - `NotesError::KeyDerivation` if the header carries out-of-bounds parameters
/// - `NotesError::DecryptionFailed` for a wrong passphrase or any tampering
pub fn decrypt_versioned(envelope: &[u8], passphrase: &[u8]) -> Result<Vec<u8>> {
    let parts = split_versioned(envelope)?;
    open_parts(&parts, passphrase)
}

/// Encrypt in the requested write format.
pub fn seal(plaintext: &[u8], passphrase: &[u8], write: &WriteFormat) -> Result<SealedPayload> {
    let envelope = match write {
        WriteFormat::Legacy => encrypt(plaintext, passphrase)?,
        WriteFormat::Versioned(kdf) => encrypt_versioned(plaintext, passphrase, kdf)?,
    };
    Ok(SealedPayload {
        envelope,
        format: write.format(),
    })
}

/// Decrypt an envelope whose layout is known from its stored format tag.
pub fn open(envelope: &[u8], passphrase: &[u8], format: EnvelopeFormat) -> Result<Vec<u8>> {
    match format {
        EnvelopeFormat::Legacy => decrypt(envelope, passphrase),
        EnvelopeFormat::Versioned => decrypt_versioned(envelope, passphrase),
    }
}

/// Stateless encryptor bound to a write format.
///
/// Holds configuration only; every call derives its own key, salt and nonce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopeCipher {
    write: WriteFormat,
}

impl EnvelopeCipher {
    pub fn new(write: WriteFormat) -> Self {
        Self { write }
    }

    pub fn write_format(&self) -> WriteFormat {
        self.write
    }

    pub fn seal(&self, plaintext: &[u8], passphrase: &[u8]) -> Result<SealedPayload> {
        seal(plaintext, passphrase, &self.write)
    }

    pub fn open(&self, envelope: &[u8], passphrase: &[u8], format: EnvelopeFormat) -> Result<Vec<u8>> {
        open(envelope, passphrase, format)
    }
}

fn seal_with(
    plaintext: &[u8],
    passphrase: &[u8],
    kdf: &KdfParams,
    salt: &[u8; SALT_LEN],
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
) -> Result<Vec<u8>> {
    let key = derive_key(passphrase, salt, kdf)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| NotesError::Validation("Payload too large to encrypt".to_string()))
}

fn open_parts(parts: &EnvelopeParts<'_>, passphrase: &[u8]) -> Result<Vec<u8>> {
    let key = derive_key(passphrase, parts.salt, &parts.kdf)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));
    cipher
        .decrypt(
            Nonce::from_slice(parts.nonce),
            Payload {
                msg: parts.ciphertext,
                aad: parts.aad,
            },
        )
        .map_err(|_| NotesError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::envelope::{MIN_LEGACY_ENVELOPE_LEN, TAG_LEN, VERSIONED_HEADER_LEN};

    fn fast_argon2() -> KdfParams {
        KdfParams::Argon2id {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let passphrase = b"correct-horse-battery-staple";
        let envelope = encrypt(b"hello world", passphrase).unwrap();
        let decrypted = decrypt(&envelope, passphrase).unwrap();
        assert_eq!(decrypted, b"hello world");
    }

    #[test]
    fn test_empty_plaintext_envelope_is_44_bytes() {
        let envelope = encrypt(b"", b"any-passphrase").unwrap();
        assert_eq!(envelope.len(), 44);
        assert_eq!(decrypt(&envelope, b"any-passphrase").unwrap(), b"");
    }

    #[test]
    fn test_envelope_length_formula() {
        let plaintext = vec![0x42u8; 1000];
        let envelope = encrypt(&plaintext, b"passphrase").unwrap();
        assert_eq!(envelope.len(), SALT_LEN + NONCE_LEN + plaintext.len() + TAG_LEN);
    }

    #[test]
    fn test_wrong_passphrase_fails_decryption() {
        let envelope = encrypt(b"secret data", b"alpha").unwrap();
        let result = decrypt(&envelope, b"beta");
        assert!(matches!(result, Err(NotesError::DecryptionFailed)));
    }

    #[test]
    fn test_same_input_produces_distinct_envelopes() {
        let first = encrypt(b"same plaintext", b"passphrase").unwrap();
        let second = encrypt(b"same plaintext", b"passphrase").unwrap();

        assert_ne!(first, second);
        assert_ne!(&first[..SALT_LEN], &second[..SALT_LEN]);
        assert_ne!(
            &first[SALT_LEN..SALT_LEN + NONCE_LEN],
            &second[SALT_LEN..SALT_LEN + NONCE_LEN]
        );
        assert_eq!(decrypt(&first, b"passphrase").unwrap(), b"same plaintext");
        assert_eq!(decrypt(&second, b"passphrase").unwrap(), b"same plaintext");
    }

    #[test]
    fn test_decrypts_hand_assembled_legacy_envelope() {
        let salt = [0x07u8; SALT_LEN];
        let nonce = [0x09u8; NONCE_LEN];
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<sha2::Sha256>(b"interop-pass", &salt, 10_000, &mut key);

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), b"from another writer".as_ref())
            .unwrap();

        let mut envelope = salt.to_vec();
        envelope.extend_from_slice(&nonce);
        envelope.extend_from_slice(&ciphertext);

        assert_eq!(
            decrypt(&envelope, b"interop-pass").unwrap(),
            b"from another writer"
        );
    }

    #[test]
    fn test_every_bit_flip_is_rejected() {
        let envelope = encrypt(b"tamper", b"passphrase").unwrap();
        // Spot-check one bit in every byte; a full sweep re-runs PBKDF2 too often.
        for index in 0..envelope.len() {
            let mut tampered = envelope.clone();
            tampered[index] ^= 1 << (index % 8);
            assert!(
                decrypt(&tampered, b"passphrase").is_err(),
                "flip at byte {} accepted",
                index
            );
        }
    }

    #[test]
    fn test_truncated_envelope_is_malformed() {
        let envelope = encrypt(b"", b"passphrase").unwrap();
        let result = decrypt(&envelope[..MIN_LEGACY_ENVELOPE_LEN - 1], b"passphrase");
        assert!(matches!(result, Err(NotesError::MalformedEnvelope(_))));
    }

    #[test]
    fn test_truncated_ciphertext_fails_authentication() {
        let envelope = encrypt(b"some longer plaintext", b"passphrase").unwrap();
        let result = decrypt(&envelope[..envelope.len() - 1], b"passphrase");
        assert!(matches!(result, Err(NotesError::DecryptionFailed)));
    }

    #[test]
    fn test_corrupted_data_fails_decryption() {
        let mut envelope = encrypt(b"secret data", b"passphrase").unwrap();
        let len = envelope.len();
        envelope[len / 2] ^= 0xFF;
        assert!(matches!(
            decrypt(&envelope, b"passphrase"),
            Err(NotesError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_versioned_round_trip_both_kdfs() {
        for kdf in [fast_argon2(), KdfParams::legacy()] {
            let envelope = encrypt_versioned(b"versioned", b"passphrase", &kdf).unwrap();
            assert_eq!(envelope.len(), VERSIONED_HEADER_LEN + 9 + TAG_LEN);
            assert_eq!(decrypt_versioned(&envelope, b"passphrase").unwrap(), b"versioned");
        }
    }

    #[test]
    fn test_versioned_header_tamper_rejected() {
        let mut envelope = encrypt_versioned(b"payload", b"passphrase", &fast_argon2()).unwrap();
        // Raise the iteration count; still within bounds, so the KDF runs
        // and the associated-data check must catch it.
        envelope[6] = 2;
        assert!(matches!(
            decrypt_versioned(&envelope, b"passphrase"),
            Err(NotesError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_versioned_wrong_passphrase() {
        let envelope = encrypt_versioned(b"payload", b"alpha", &fast_argon2()).unwrap();
        assert!(matches!(
            decrypt_versioned(&envelope, b"beta"),
            Err(NotesError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_versioned_rejects_invalid_kdf() {
        let kdf = KdfParams::Pbkdf2Sha256 { rounds: 1 };
        assert!(matches!(
            encrypt_versioned(b"payload", b"passphrase", &kdf),
            Err(NotesError::KeyDerivation(_))
        ));
    }

    #[test]
    fn test_formats_are_not_interchangeable() {
        let legacy = encrypt(b"payload", b"passphrase").unwrap();
        assert!(open(&legacy, b"passphrase", EnvelopeFormat::Versioned).is_err());

        let versioned = encrypt_versioned(b"payload", b"passphrase", &fast_argon2()).unwrap();
        assert!(open(&versioned, b"passphrase", EnvelopeFormat::Legacy).is_err());
    }

    #[test]
    fn test_cipher_seal_open_dispatch() {
        let cipher = EnvelopeCipher::new(WriteFormat::Versioned(fast_argon2()));
        let sealed = cipher.seal(b"note", b"passphrase").unwrap();
        assert_eq!(sealed.format, EnvelopeFormat::Versioned);
        assert_eq!(
            cipher
                .open(&sealed.envelope, b"passphrase", sealed.format)
                .unwrap(),
            b"note"
        );

        let legacy = EnvelopeCipher::default().seal(b"note", b"passphrase").unwrap();
        assert_eq!(legacy.format, EnvelopeFormat::Legacy);
        assert_eq!(legacy.envelope.len(), 4 + 44);
    }
}
