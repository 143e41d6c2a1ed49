//! # SecretNotes Core
//!
//! Core library for SecretNotes - a passphrase-gated encrypted note and file store.
//!
//! A passphrase is both the lookup key and the encryption key. The store keeps
//! only a one-way hash of the passphrase and encrypted envelopes; plaintext
//! exists only for the duration of a single operation.
//!
//! ## Architecture
//!
//! - **crypto**: lookup token derivation, key derivation, envelope formats and
//!   the AES-256-GCM encryption engine
//! - **storage**: record store trait and the SQLite implementation
//! - **service**: note and attachment operations built on the two above
//! - **fs**: atomic file writes used by front-ends
//!
//! ## Example
//!
//! ```
//! use secretnotes_core::crypto::{decrypt, encrypt};
//!
//! let envelope = encrypt(b"hello world", b"correct-horse-battery-staple").unwrap();
//! let plaintext = decrypt(&envelope, b"correct-horse-battery-staple").unwrap();
//! assert_eq!(plaintext, b"hello world");
//! ```

pub mod crypto;
pub mod error;
pub mod fs;
pub mod service;
pub mod storage;

pub use crypto::{derive_lookup_token, LookupToken, Passphrase, PassphrasePolicy};
pub use error::{NotesError, Result};
pub use service::{
    AttachmentReceipt, DecryptedFile, NewFile, Note, NoteService, ServiceOptions,
};
pub use storage::{NoteStore, SqliteStore};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
