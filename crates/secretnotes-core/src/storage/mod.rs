//! Storage abstraction for SecretNotes.
//!
//! This module defines the `NoteStore` trait and the record types it
//! persists.
//!
//! ## Security
//!
//! The store only ever holds:
//! - Lookup tokens (one-way SHA-256 of the passphrase)
//! - Encrypted envelopes and their format version
//! - Non-secret metadata (file name, content type, size, timestamps)

pub mod sqlite;
pub mod traits;
pub mod types;

pub use sqlite::SqliteStore;
pub use traits::NoteStore;
pub use types::{envelope_hash, AttachmentRecord, NewAttachment, NewNote, NoteRecord, StoreStats};
