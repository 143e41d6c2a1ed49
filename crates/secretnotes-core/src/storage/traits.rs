//! Record store trait definition.
//!
//! The `NoteStore` trait is the only surface the note service uses to
//! persist data. Implementations store envelopes verbatim and never see a
//! passphrase or plaintext.

use super::types::{AttachmentRecord, NewAttachment, NewNote, NoteRecord, StoreStats};
use crate::crypto::{LookupToken, SealedPayload};
use crate::error::Result;

/// Storage interface for notes and attachments keyed by lookup token.
///
/// All implementations must ensure:
/// - At most one note and one attachment per lookup token
/// - Multi-row changes are atomic
/// - Envelopes are returned byte-for-byte as stored
pub trait NoteStore: Send + Sync {
    // --- Note operations ---

    /// Get the note stored under a token.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    fn find_note(&self, token: &LookupToken) -> Result<Option<NoteRecord>>;

    /// Insert a new note.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::Validation` if a note already exists for the token.
    fn insert_note(&self, note: &NewNote) -> Result<NoteRecord>;

    /// Replace a note's message envelope.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::NoteNotFound` if no note exists for the token.
    fn update_note_envelope(&self, token: &LookupToken, sealed: &SealedPayload)
        -> Result<NoteRecord>;

    /// Delete a note and its attachment.
    ///
    /// # Returns
    ///
    /// Returns `true` if a note was removed.
    fn delete_note(&self, token: &LookupToken) -> Result<bool>;

    // --- Attachment operations ---

    /// Get the attachment stored under a token.
    fn find_attachment(&self, token: &LookupToken) -> Result<Option<AttachmentRecord>>;

    /// Store an attachment, replacing any existing one for the same token.
    ///
    /// The note's attachment hash is set to [`envelope_hash`] of the new
    /// envelope in the same transaction.
    ///
    /// [`envelope_hash`]: super::types::envelope_hash
    ///
    /// # Errors
    ///
    /// Returns `NotesError::NoteNotFound` if no note exists for the token.
    fn replace_attachment(&self, attachment: &NewAttachment) -> Result<AttachmentRecord>;

    /// Delete the attachment stored under a token and clear the note's
    /// attachment hash, atomically.
    ///
    /// # Returns
    ///
    /// Returns `true` if an attachment was removed.
    fn delete_attachment(&self, token: &LookupToken) -> Result<bool>;

    // --- Maintenance ---

    /// Verify database integrity.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::Storage` describing the first problem found.
    fn check_integrity(&self) -> Result<StoreStats>;
}
