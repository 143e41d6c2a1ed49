//! Record types persisted by the storage layer.
//!
//! Records hold envelopes, never plaintext. Each envelope is paired with the
//! [`EnvelopeFormat`] it was written in so that reads can dispatch without
//! guessing.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::crypto::{EnvelopeFormat, LookupToken, SealedPayload};

/// A stored note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRecord {
    /// Unique identifier for this note
    pub id: Uuid,

    /// Index key derived from the passphrase
    pub lookup_token: LookupToken,

    /// Encrypted message
    pub envelope: Vec<u8>,

    /// Layout of `envelope`
    pub envelope_format: EnvelopeFormat,

    /// Hex SHA-256 of the current attachment's envelope, if any
    pub attachment_hash: Option<String>,

    /// When this note was created
    pub created_at: DateTime<Utc>,

    /// Last time the message or attachment changed
    pub updated_at: DateTime<Utc>,
}

/// A stored attachment. At most one exists per lookup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRecord {
    pub id: Uuid,
    pub lookup_token: LookupToken,
    pub file_name: String,
    pub content_type: String,

    /// Encrypted file bytes
    pub envelope: Vec<u8>,
    pub envelope_format: EnvelopeFormat,

    /// Plaintext size in bytes
    pub size: u64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Builder for creating a new note.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub lookup_token: LookupToken,
    pub sealed: SealedPayload,
}

impl NewNote {
    pub fn new(lookup_token: LookupToken, sealed: SealedPayload) -> Self {
        Self {
            lookup_token,
            sealed,
        }
    }
}

/// Builder for storing an attachment.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub lookup_token: LookupToken,
    pub file_name: String,
    pub content_type: String,
    pub sealed: SealedPayload,

    /// Plaintext size in bytes
    pub size: u64,
}

/// Hex SHA-256 of a stored envelope.
///
/// Notes record this value for their attachment, so it identifies the
/// ciphertext and reveals nothing about the file.
pub fn envelope_hash(envelope: &[u8]) -> String {
    hex::encode(Sha256::digest(envelope))
}

impl NewAttachment {
    pub fn new(
        lookup_token: LookupToken,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        sealed: SealedPayload,
        size: u64,
    ) -> Self {
        Self {
            lookup_token,
            file_name: file_name.into(),
            content_type: content_type.into(),
            sealed,
            size,
        }
    }

    /// Hash the note records for this attachment.
    pub fn envelope_hash(&self) -> String {
        envelope_hash(&self.sealed.envelope)
    }
}

/// Row counts reported by an integrity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub notes: u64,
    pub attachments: u64,
}
