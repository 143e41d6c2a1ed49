//! Note and attachment operations.
//!
//! `NoteService` ties the pieces together: the passphrase policy gates every
//! call, the lookup token finds the record, and the envelope cipher seals or
//! opens its contents. The service holds no mutable state; every call
//! re-derives the token and the envelope key.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::crypto::{
    derive_lookup_token, EnvelopeCipher, LookupToken, Passphrase, PassphrasePolicy, WriteFormat,
};
use crate::error::{NotesError, Result};
use crate::storage::{NewAttachment, NewNote, NoteRecord, NoteStore};

/// Default attachment size limit (10 MiB).
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Content type recorded when the caller supplies none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub policy: PassphrasePolicy,
    pub write_format: WriteFormat,
    pub max_attachment_bytes: u64,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            policy: PassphrasePolicy::default(),
            write_format: WriteFormat::Legacy,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        }
    }
}

/// A decrypted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: Uuid,
    pub message: String,
    pub has_attachment: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A file to attach to a note.
#[derive(Clone)]
pub struct NewFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl NewFile {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

impl std::fmt::Debug for NewFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Metadata returned after storing an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentReceipt {
    /// Hex SHA-256 of the stored envelope
    pub file_hash: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub created_at: DateTime<Utc>,
}

/// A decrypted attachment.
#[derive(Clone)]
pub struct DecryptedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for DecryptedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Passphrase-gated note operations over a [`NoteStore`].
pub struct NoteService<S: NoteStore> {
    store: S,
    options: ServiceOptions,
    cipher: EnvelopeCipher,
}

impl<S: NoteStore> NoteService<S> {
    pub fn new(store: S, options: ServiceOptions) -> Self {
        Self {
            store,
            cipher: EnvelopeCipher::new(options.write_format),
            options,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ServiceOptions {
        &self.options
    }

    /// Validate the passphrase against the policy and derive its lookup token.
    pub fn lookup_token(&self, passphrase: &Passphrase) -> Result<LookupToken> {
        self.options.policy.validate(passphrase)?;
        Ok(derive_lookup_token(passphrase.expose()))
    }

    /// Return the note for this passphrase, creating an empty one if absent.
    ///
    /// The flag is `true` when this call created the note.
    pub fn get_or_create_note(&self, passphrase: &Passphrase) -> Result<(Note, bool)> {
        let token = self.lookup_token(passphrase)?;

        if let Some(record) = self.store.find_note(&token)? {
            debug!(token = %token, "Opened existing note");
            let note = self.open_note(record, passphrase)?;
            return Ok((note, false));
        }

        let note = self.create_note(token, passphrase, "")?;
        Ok((note, true))
    }

    /// Replace the message of an existing note.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::NoteNotFound` if no note exists for the passphrase.
    pub fn update_note(&self, passphrase: &Passphrase, message: &str) -> Result<Note> {
        let token = self.lookup_token(passphrase)?;
        let sealed = self.cipher.seal(message.as_bytes(), passphrase.expose())?;
        let record = self.store.update_note_envelope(&token, &sealed)?;
        debug!(token = %token, format = ?sealed.format, "Updated note");
        Ok(note_from_record(record, message.to_string()))
    }

    /// Create the note with `message`, or replace the message if it exists.
    ///
    /// The flag is `true` when this call created the note.
    pub fn upsert_note(&self, passphrase: &Passphrase, message: &str) -> Result<(Note, bool)> {
        let token = self.lookup_token(passphrase)?;

        if self.store.find_note(&token)?.is_some() {
            let note = self.update_note(passphrase, message)?;
            return Ok((note, false));
        }

        let note = self.create_note(token, passphrase, message)?;
        Ok((note, true))
    }

    /// Delete the note and its attachment.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::NoteNotFound` if no note exists for the passphrase.
    pub fn delete_note(&self, passphrase: &Passphrase) -> Result<()> {
        let token = self.lookup_token(passphrase)?;
        if !self.store.delete_note(&token)? {
            return Err(NotesError::NoteNotFound);
        }
        info!(token = %token, "Deleted note");
        Ok(())
    }

    /// Encrypt and store a file, replacing any previous attachment.
    ///
    /// Creates an empty note first if none exists.
    ///
    /// # Errors
    ///
    /// - `NotesError::Validation` if the file exceeds the size limit
    /// - `NotesError::InvalidInput` if the file name is empty
    pub fn attach_file(&self, passphrase: &Passphrase, file: NewFile) -> Result<AttachmentReceipt> {
        let token = self.lookup_token(passphrase)?;

        let size = file.bytes.len() as u64;
        if size > self.options.max_attachment_bytes {
            return Err(NotesError::Validation(format!(
                "File exceeds maximum size of {} bytes",
                self.options.max_attachment_bytes
            )));
        }
        let file_name = file.file_name.trim();
        if file_name.is_empty() {
            return Err(NotesError::InvalidInput(
                "File name cannot be empty".to_string(),
            ));
        }
        let content_type = match file.content_type.trim() {
            "" => DEFAULT_CONTENT_TYPE,
            value => value,
        };

        if self.store.find_note(&token)?.is_none() {
            self.create_note(token, passphrase, "")?;
        }

        let sealed = self.cipher.seal(&file.bytes, passphrase.expose())?;
        let attachment = NewAttachment::new(token, file_name, content_type, sealed, size);
        let file_hash = attachment.envelope_hash();
        let record = self.store.replace_attachment(&attachment)?;

        info!(token = %token, size, "Stored attachment");
        Ok(AttachmentReceipt {
            file_hash,
            file_name: record.file_name,
            content_type: record.content_type,
            size: record.size,
            created_at: record.created_at,
        })
    }

    /// Decrypt the attachment stored for this passphrase.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::AttachmentNotFound` if there is none.
    pub fn fetch_file(&self, passphrase: &Passphrase) -> Result<DecryptedFile> {
        let token = self.lookup_token(passphrase)?;
        let record = self
            .store
            .find_attachment(&token)?
            .ok_or(NotesError::AttachmentNotFound)?;

        let bytes = self
            .cipher
            .open(&record.envelope, passphrase.expose(), record.envelope_format)?;
        debug!(token = %token, size = bytes.len(), "Opened attachment");

        Ok(DecryptedFile {
            file_name: record.file_name,
            content_type: record.content_type,
            bytes,
        })
    }

    /// Delete the attachment and clear the note's reference to it.
    ///
    /// # Errors
    ///
    /// Returns `NotesError::AttachmentNotFound` if there is none.
    pub fn delete_file(&self, passphrase: &Passphrase) -> Result<()> {
        let token = self.lookup_token(passphrase)?;
        if !self.store.delete_attachment(&token)? {
            return Err(NotesError::AttachmentNotFound);
        }
        info!(token = %token, "Deleted attachment");
        Ok(())
    }

    fn create_note(&self, token: LookupToken, passphrase: &Passphrase, message: &str) -> Result<Note> {
        let sealed = self.cipher.seal(message.as_bytes(), passphrase.expose())?;
        let record = self.store.insert_note(&NewNote::new(token, sealed))?;
        info!(token = %token, "Created note");
        Ok(note_from_record(record, message.to_string()))
    }

    fn open_note(&self, record: NoteRecord, passphrase: &Passphrase) -> Result<Note> {
        let plaintext = self
            .cipher
            .open(&record.envelope, passphrase.expose(), record.envelope_format)?;
        // Anything that is not UTF-8 was not written by this service.
        let message = String::from_utf8(plaintext).map_err(|_| NotesError::DecryptionFailed)?;
        Ok(note_from_record(record, message))
    }
}

fn note_from_record(record: NoteRecord, message: String) -> Note {
    Note {
        id: record.id,
        message,
        has_attachment: record.attachment_hash.is_some(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}
