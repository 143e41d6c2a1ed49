//! Row types for database queries.

use chrono::{DateTime, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::crypto::{EnvelopeFormat, LookupToken};
use crate::error::{NotesError, Result};
use crate::storage::types::{AttachmentRecord, NoteRecord};

pub(super) const NOTE_COLUMNS: &str =
    "id, lookup_token, envelope, envelope_version, attachment_hash, created_at, updated_at";

pub(super) const ATTACHMENT_COLUMNS: &str = "id, lookup_token, file_name, content_type, envelope, envelope_version, size, created_at, updated_at";

/// Raw row data from the notes table, before parsing into domain types.
#[derive(Debug)]
pub(super) struct NoteRow {
    pub id: String,
    pub lookup_token: String,
    pub envelope: Vec<u8>,
    pub envelope_version: i64,
    pub attachment_hash: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            lookup_token: row.get(1)?,
            envelope: row.get(2)?,
            envelope_version: row.get(3)?,
            attachment_hash: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

impl TryFrom<NoteRow> for NoteRecord {
    type Error = NotesError;

    fn try_from(row: NoteRow) -> Result<Self> {
        Ok(NoteRecord {
            id: parse_uuid(&row.id)?,
            lookup_token: parse_token(&row.lookup_token)?,
            envelope: row.envelope,
            envelope_format: EnvelopeFormat::from_version(row.envelope_version)?,
            attachment_hash: row.attachment_hash,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the attachments table.
#[derive(Debug)]
pub(super) struct AttachmentRow {
    pub id: String,
    pub lookup_token: String,
    pub file_name: String,
    pub content_type: String,
    pub envelope: Vec<u8>,
    pub envelope_version: i64,
    pub size: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl AttachmentRow {
    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            lookup_token: row.get(1)?,
            file_name: row.get(2)?,
            content_type: row.get(3)?,
            envelope: row.get(4)?,
            envelope_version: row.get(5)?,
            size: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<AttachmentRow> for AttachmentRecord {
    type Error = NotesError;

    fn try_from(row: AttachmentRow) -> Result<Self> {
        let size = u64::try_from(row.size)
            .map_err(|_| NotesError::Storage(format!("Invalid attachment size: {}", row.size)))?;

        Ok(AttachmentRecord {
            id: parse_uuid(&row.id)?,
            lookup_token: parse_token(&row.lookup_token)?,
            file_name: row.file_name,
            content_type: row.content_type,
            envelope: row.envelope,
            envelope_format: EnvelopeFormat::from_version(row.envelope_version)?,
            size,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| NotesError::Storage(format!("Invalid record UUID: {}", e)))
}

fn parse_token(value: &str) -> Result<LookupToken> {
    LookupToken::from_hex(value)
        .map_err(|e| NotesError::Storage(format!("Invalid stored lookup token: {}", e)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| NotesError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}
