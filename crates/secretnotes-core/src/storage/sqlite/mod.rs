//! SQLite record store.
//!
//! Notes and attachments live in two tables keyed by the hex lookup token.
//! Envelopes are stored verbatim as BLOBs next to their format version.
//! Schema changes are applied in order and tracked with `PRAGMA user_version`.

mod row;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use crate::crypto::{LookupToken, SealedPayload, MIN_LEGACY_ENVELOPE_LEN, MIN_VERSIONED_ENVELOPE_LEN};
use crate::error::{NotesError, Result};
use crate::storage::traits::NoteStore;
use crate::storage::types::{
    envelope_hash, AttachmentRecord, NewAttachment, NewNote, NoteRecord, StoreStats,
};

use row::{AttachmentRow, NoteRow, ATTACHMENT_COLUMNS, NOTE_COLUMNS};

const MIGRATIONS: &[&str] = &[r#"
    CREATE TABLE notes (
        id TEXT PRIMARY KEY,
        lookup_token TEXT NOT NULL,
        envelope BLOB NOT NULL,
        envelope_version INTEGER NOT NULL DEFAULT 0,
        attachment_hash TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE UNIQUE INDEX idx_notes_lookup_token ON notes(lookup_token);

    CREATE TABLE attachments (
        id TEXT PRIMARY KEY,
        lookup_token TEXT NOT NULL,
        file_name TEXT NOT NULL,
        content_type TEXT NOT NULL,
        envelope BLOB NOT NULL,
        envelope_version INTEGER NOT NULL DEFAULT 0,
        size INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        FOREIGN KEY(lookup_token) REFERENCES notes(lookup_token) ON DELETE CASCADE
    );

    CREATE UNIQUE INDEX idx_attachments_lookup_token ON attachments(lookup_token);
"#];

/// Schema version written by this build.
pub const SCHEMA_VERSION: i64 = MIGRATIONS.len() as i64;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed note store.
pub struct SqliteStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store file, applying pending migrations.
    ///
    /// Missing parent directories are created. On Unix the database file is
    /// restricted to the owner.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        restrict_permissions(path)?;
        let store = Self::init(conn, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "Opened note store");
        Ok(store)
    }

    /// Open a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, None)
    }

    fn init(mut conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrate(&mut conn)?;

        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Location of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current `user_version` of the open database.
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| NotesError::Storage("SQLite connection poisoned".to_string()))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

fn migrate(conn: &mut Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current > SCHEMA_VERSION {
        return Err(NotesError::Storage(format!(
            "Store schema version {} is newer than supported version {}",
            current, SCHEMA_VERSION
        )));
    }
    let applied = usize::try_from(current)
        .map_err(|_| NotesError::Storage(format!("Invalid store schema version: {}", current)))?;

    for (index, sql) in MIGRATIONS.iter().enumerate().skip(applied) {
        let version = index as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        debug!(version, "Applied store migration");
    }

    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

fn select_note(conn: &Connection, token: &LookupToken) -> Result<Option<NoteRecord>> {
    let row = conn
        .query_row(
            &format!("SELECT {} FROM notes WHERE lookup_token = ?", NOTE_COLUMNS),
            [token.to_hex()],
            NoteRow::from_row,
        )
        .optional()?;
    row.map(NoteRecord::try_from).transpose()
}

fn select_attachment(conn: &Connection, token: &LookupToken) -> Result<Option<AttachmentRecord>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {} FROM attachments WHERE lookup_token = ?",
                ATTACHMENT_COLUMNS
            ),
            [token.to_hex()],
            AttachmentRow::from_row,
        )
        .optional()?;
    row.map(AttachmentRecord::try_from).transpose()
}

/// Attachments whose note hash is missing or names a different envelope.
fn unrecorded_attachments(conn: &Connection) -> Result<u64> {
    let mut stmt = conn.prepare(
        "SELECT a.envelope, n.attachment_hash FROM attachments a JOIN notes n ON n.lookup_token = a.lookup_token",
    )?;
    let mut rows = stmt.query([])?;
    let mut mismatched = 0;
    while let Some(row) = rows.next()? {
        let envelope: Vec<u8> = row.get(0)?;
        let recorded: Option<String> = row.get(1)?;
        if recorded.as_deref() != Some(envelope_hash(&envelope).as_str()) {
            mismatched += 1;
        }
    }
    Ok(mismatched)
}

fn count(conn: &Connection, sql: &str) -> Result<u64> {
    let value: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(u64::try_from(value).unwrap_or(0))
}

impl NoteStore for SqliteStore {
    fn find_note(&self, token: &LookupToken) -> Result<Option<NoteRecord>> {
        let conn = self.lock_conn()?;
        select_note(&conn, token)
    }

    fn insert_note(&self, note: &NewNote) -> Result<NoteRecord> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let token = note.lookup_token.to_hex();
        let exists: Option<String> = tx
            .query_row(
                "SELECT id FROM notes WHERE lookup_token = ?",
                [&token],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(NotesError::Validation(
                "A note already exists for this passphrase".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        tx.execute(
            r#"
            INSERT INTO notes (
                id,
                lookup_token,
                envelope,
                envelope_version,
                attachment_hash,
                created_at,
                updated_at
            )
            VALUES (?, ?, ?, ?, NULL, ?, ?)
            "#,
            (
                Uuid::new_v4().to_string(),
                &token,
                &note.sealed.envelope,
                i64::from(note.sealed.format.version()),
                &now,
                &now,
            ),
        )?;

        let record = select_note(&tx, &note.lookup_token)?
            .ok_or_else(|| NotesError::Storage("Inserted note not found".to_string()))?;
        tx.commit()?;

        debug!(token = %note.lookup_token, "Inserted note record");
        Ok(record)
    }

    fn update_note_envelope(
        &self,
        token: &LookupToken,
        sealed: &SealedPayload,
    ) -> Result<NoteRecord> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE notes SET envelope = ?, envelope_version = ?, updated_at = ? WHERE lookup_token = ?",
            (
                &sealed.envelope,
                i64::from(sealed.format.version()),
                Utc::now().to_rfc3339(),
                token.to_hex(),
            ),
        )?;
        if changed == 0 {
            return Err(NotesError::NoteNotFound);
        }

        let record = select_note(&tx, token)?.ok_or(NotesError::NoteNotFound)?;
        tx.commit()?;
        Ok(record)
    }

    fn delete_note(&self, token: &LookupToken) -> Result<bool> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let token_hex = token.to_hex();
        tx.execute("DELETE FROM attachments WHERE lookup_token = ?", [&token_hex])?;
        let removed = tx.execute("DELETE FROM notes WHERE lookup_token = ?", [&token_hex])?;
        tx.commit()?;

        Ok(removed > 0)
    }

    fn find_attachment(&self, token: &LookupToken) -> Result<Option<AttachmentRecord>> {
        let conn = self.lock_conn()?;
        select_attachment(&conn, token)
    }

    fn replace_attachment(&self, attachment: &NewAttachment) -> Result<AttachmentRecord> {
        let size = i64::try_from(attachment.size)
            .map_err(|_| NotesError::Validation("Attachment too large".to_string()))?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let token = attachment.lookup_token.to_hex();
        let note_exists: Option<String> = tx
            .query_row(
                "SELECT id FROM notes WHERE lookup_token = ?",
                [&token],
                |row| row.get(0),
            )
            .optional()?;
        if note_exists.is_none() {
            return Err(NotesError::NoteNotFound);
        }

        tx.execute("DELETE FROM attachments WHERE lookup_token = ?", [&token])?;

        let now = Utc::now().to_rfc3339();
        tx.execute(
            r#"
            INSERT INTO attachments (
                id,
                lookup_token,
                file_name,
                content_type,
                envelope,
                envelope_version,
                size,
                created_at,
                updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            (
                Uuid::new_v4().to_string(),
                &token,
                &attachment.file_name,
                &attachment.content_type,
                &attachment.sealed.envelope,
                i64::from(attachment.sealed.format.version()),
                size,
                &now,
                &now,
            ),
        )?;

        tx.execute(
            "UPDATE notes SET attachment_hash = ?, updated_at = ? WHERE lookup_token = ?",
            (attachment.envelope_hash(), &now, &token),
        )?;

        let record = select_attachment(&tx, &attachment.lookup_token)?
            .ok_or_else(|| NotesError::Storage("Inserted attachment not found".to_string()))?;
        tx.commit()?;

        debug!(token = %attachment.lookup_token, size = attachment.size, "Stored attachment record");
        Ok(record)
    }

    fn delete_attachment(&self, token: &LookupToken) -> Result<bool> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        let token_hex = token.to_hex();
        let removed = tx.execute("DELETE FROM attachments WHERE lookup_token = ?", [&token_hex])?;
        if removed > 0 {
            tx.execute(
                "UPDATE notes SET attachment_hash = NULL, updated_at = ? WHERE lookup_token = ?",
                (Utc::now().to_rfc3339(), &token_hex),
            )?;
        }
        tx.commit()?;

        Ok(removed > 0)
    }

    fn check_integrity(&self) -> Result<StoreStats> {
        let conn = self.lock_conn()?;

        let status: String = conn.query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        if status != "ok" {
            return Err(NotesError::Storage(format!(
                "SQLite integrity check failed: {}",
                status
            )));
        }

        let mut stmt = conn.prepare("PRAGMA foreign_key_check")?;
        let mut rows = stmt.query([])?;
        if rows.next()?.is_some() {
            return Err(NotesError::Storage(
                "Attachment without a note".to_string(),
            ));
        }
        drop(rows);
        drop(stmt);

        let dangling = count(
            &conn,
            "SELECT COUNT(*) FROM notes n LEFT JOIN attachments a ON a.lookup_token = n.lookup_token WHERE n.attachment_hash IS NOT NULL AND a.id IS NULL",
        )?;
        if dangling > 0 {
            return Err(NotesError::Storage(format!(
                "{} note(s) reference a missing attachment",
                dangling
            )));
        }

        let unrecorded = unrecorded_attachments(&conn)?;
        if unrecorded > 0 {
            return Err(NotesError::Storage(format!(
                "{} attachment(s) not recorded on their note",
                unrecorded
            )));
        }

        let unknown_versions = count(
            &conn,
            "SELECT (SELECT COUNT(*) FROM notes WHERE envelope_version NOT IN (0, 1)) + (SELECT COUNT(*) FROM attachments WHERE envelope_version NOT IN (0, 1))",
        )?;
        if unknown_versions > 0 {
            return Err(NotesError::Storage(format!(
                "{} record(s) have an unknown envelope version",
                unknown_versions
            )));
        }

        let short_envelopes = count(
            &conn,
            &format!(
                "SELECT (SELECT COUNT(*) FROM notes WHERE (envelope_version = 0 AND length(envelope) < {legacy}) OR (envelope_version = 1 AND length(envelope) < {versioned})) \
                 + (SELECT COUNT(*) FROM attachments WHERE (envelope_version = 0 AND length(envelope) < {legacy}) OR (envelope_version = 1 AND length(envelope) < {versioned}))",
                legacy = MIN_LEGACY_ENVELOPE_LEN,
                versioned = MIN_VERSIONED_ENVELOPE_LEN,
            ),
        )?;
        if short_envelopes > 0 {
            return Err(NotesError::Storage(format!(
                "{} record(s) hold a truncated envelope",
                short_envelopes
            )));
        }

        Ok(StoreStats {
            notes: count(&conn, "SELECT COUNT(*) FROM notes")?,
            attachments: count(&conn, "SELECT COUNT(*) FROM attachments")?,
        })
    }
}
