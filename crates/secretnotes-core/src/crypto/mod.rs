//! Cryptographic operations for SecretNotes.
//!
//! This module derives everything from a single passphrase:
//! - **Lookup token**: one SHA-256 pass, used only as a storage index
//! - **Envelope key**: PBKDF2-HMAC-SHA256 (legacy) or Argon2id (versioned
//!   envelopes), salted freshly on every encryption
//! - **AES-256-GCM**: authenticated encryption of note text and file bytes
//!
//! ## Security Model
//!
//! - No passphrase, derived key or plaintext is persisted
//! - Key material is zeroized from memory on drop
//! - Every encryption draws a fresh salt and nonce from the OS RNG
//! - Decryption failures never reveal their cause
//!
//! ## Threat Model
//!
//! We defend against:
//! - Theft of the record store
//! - Offline brute-force attacks on passphrases (slow KDF)
//! - Tampering with stored envelopes (AEAD authentication)
//!
//! We do NOT defend against:
//! - Low-entropy passphrases (the lookup token is a fast hash)
//! - Compromised OS / keylogger

pub mod engine;
pub mod envelope;
pub mod identity;
pub mod kdf;
pub mod passphrase;
mod random;

pub use engine::{
    decrypt, decrypt_versioned, encrypt, encrypt_versioned, open, seal, EnvelopeCipher,
    SealedPayload, WriteFormat,
};
pub use envelope::{
    EnvelopeFormat, MIN_LEGACY_ENVELOPE_LEN, MIN_VERSIONED_ENVELOPE_LEN, NONCE_LEN, SALT_LEN,
    TAG_LEN,
};
pub use identity::{derive_lookup_token, LookupToken, LOOKUP_TOKEN_LEN};
pub use kdf::{derive_key, DerivedKey, KdfParams, KEY_LEN, LEGACY_PBKDF2_ROUNDS};
pub use passphrase::{Passphrase, PassphrasePolicy};
