//! Error types for SecretNotes core operations.
//!
//! This module defines the error hierarchy for all core operations.
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-friendly messages.
//!
//! Decryption failures are deliberately opaque: a wrong passphrase, a
//! tampered envelope and a truncated envelope all surface as
//! [`NotesError::DecryptionFailed`].

use thiserror::Error;

/// Result type alias for SecretNotes operations.
pub type Result<T> = std::result::Result<T, NotesError>;

/// Core error type for SecretNotes operations.
#[derive(Debug, Error)]
pub enum NotesError {
    /// The operating system could not supply cryptographic randomness
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),

    /// Envelope is structurally invalid (too short, unknown version or KDF)
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Authentication failed: wrong passphrase or corrupted data
    #[error("Decryption failed: wrong passphrase or corrupted data")]
    DecryptionFailed,

    /// Key derivation failed (invalid parameters)
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    /// Passphrase shorter than the configured policy minimum
    #[error("Passphrase must be at least {min} characters long (got {actual})")]
    PassphraseTooShort { min: usize, actual: usize },

    /// No note stored under the lookup token
    #[error("Note not found")]
    NoteNotFound,

    /// No attachment stored under the lookup token
    #[error("Attachment not found")]
    AttachmentNotFound,

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },
}

impl NotesError {
    /// Whether this error must be presented as "wrong passphrase or no such note".
    ///
    /// Distinguishing a failed decryption from a missing record would let a
    /// caller probe for valid lookup tokens.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, NotesError::DecryptionFailed | NotesError::NoteNotFound)
    }

    /// Whether the error indicates a broken host or configuration rather than bad input.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NotesError::RandomGeneration(_) | NotesError::KeyDerivation(_)
        )
    }
}

impl From<std::io::Error> for NotesError {
    fn from(err: std::io::Error) -> Self {
        NotesError::Storage(err.to_string())
    }
}
