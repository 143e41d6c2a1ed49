use std::path::Path;

use secretnotes_core::crypto::{EnvelopeFormat, KdfParams, LookupToken, SealedPayload, WriteFormat};
use secretnotes_core::service::{NewFile, ServiceOptions};
use secretnotes_core::storage::{
    AttachmentRecord, NewAttachment, NewNote, NoteRecord, NoteStore, SqliteStore, StoreStats,
};
use secretnotes_core::{NoteService, NotesError, Passphrase, PassphrasePolicy};

fn open_service(path: &Path, write_format: WriteFormat) -> NoteService<SqliteStore> {
    let store = SqliteStore::open(path).expect("store should open");
    NoteService::new(
        store,
        ServiceOptions {
            write_format,
            ..ServiceOptions::default()
        },
    )
}

fn fast_versioned() -> WriteFormat {
    WriteFormat::Versioned(KdfParams::Argon2id {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
}

#[test]
fn test_mixed_formats_dispatch_by_stored_version() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("notes.db");
    let passphrase = Passphrase::from("mixed-format-pass");

    {
        let legacy = open_service(&path, WriteFormat::Legacy);
        legacy
            .upsert_note(&passphrase, "written as legacy")
            .expect("upsert should succeed");
    }

    let versioned = open_service(&path, fast_versioned());
    let (note, created) = versioned
        .get_or_create_note(&passphrase)
        .expect("legacy note should open");
    assert!(!created);
    assert_eq!(note.message, "written as legacy");

    versioned
        .update_note(&passphrase, "rewritten as v1")
        .expect("update should succeed");
    let token = versioned.lookup_token(&passphrase).expect("token");
    let record = versioned
        .store()
        .find_note(&token)
        .expect("find should succeed")
        .expect("note should exist");
    assert_eq!(record.envelope_format, EnvelopeFormat::Versioned);
    drop(versioned);

    let legacy = open_service(&path, WriteFormat::Legacy);
    let (note, _) = legacy
        .get_or_create_note(&passphrase)
        .expect("versioned note should open");
    assert_eq!(note.message, "rewritten as v1");
}

#[test]
fn test_wrong_passphrase_finds_nothing() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let service = open_service(&dir.path().join("notes.db"), WriteFormat::Legacy);

    service
        .upsert_note(&Passphrase::from("owner-pass"), "private")
        .expect("upsert should succeed");

    let err = service
        .update_note(&Passphrase::from("intruder-pass"), "overwrite")
        .unwrap_err();
    assert!(err.is_access_denied());

    let (note, created) = service
        .get_or_create_note(&Passphrase::from("owner-pass"))
        .expect("owner note should open");
    assert!(!created);
    assert_eq!(note.message, "private");
}

#[test]
fn test_tampered_record_is_access_denied() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("notes.db");
    let passphrase = Passphrase::from("tamper-pass");

    let service = open_service(&path, WriteFormat::Legacy);
    service
        .upsert_note(&passphrase, "original")
        .expect("upsert should succeed");

    let token = service.lookup_token(&passphrase).expect("token");
    let mut record = service
        .store()
        .find_note(&token)
        .expect("find should succeed")
        .expect("note should exist");
    let last = record.envelope.len() - 1;
    record.envelope[last] ^= 0x01;
    service
        .store()
        .update_note_envelope(
            &token,
            &secretnotes_core::crypto::SealedPayload {
                envelope: record.envelope,
                format: record.envelope_format,
            },
        )
        .expect("raw update should succeed");

    let err = service.get_or_create_note(&passphrase).unwrap_err();
    assert!(matches!(err, NotesError::DecryptionFailed));
    assert!(err.is_access_denied());
}

#[test]
fn test_strict_policy_rejects_short_passphrase() {
    let store = SqliteStore::open_in_memory().expect("store should open");
    let service = NoteService::new(
        store,
        ServiceOptions {
            policy: PassphrasePolicy::strict(),
            ..ServiceOptions::default()
        },
    );

    let result = service.upsert_note(&Passphrase::from("only-sixteen-chr"), "x");
    assert!(matches!(
        result,
        Err(NotesError::PassphraseTooShort { min: 32, actual: 16 })
    ));

    let long = Passphrase::from("a-passphrase-that-is-long-enough-for-strict");
    service
        .upsert_note(&long, "accepted")
        .expect("long passphrase should pass");
}

#[test]
fn test_file_round_trip_through_disk_store() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("notes.db");
    let passphrase = Passphrase::from("file-pass");
    let bytes: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    {
        let service = open_service(&path, WriteFormat::Legacy);
        let receipt = service
            .attach_file(
                &passphrase,
                NewFile::new("blob.bin", "application/octet-stream", bytes.clone()),
            )
            .expect("attach should succeed");
        assert_eq!(receipt.size, 4096);
    }

    let service = open_service(&path, WriteFormat::Legacy);
    let file = service.fetch_file(&passphrase).expect("fetch should succeed");
    assert_eq!(file.bytes, bytes);
    assert_eq!(file.file_name, "blob.bin");

    let stats = service
        .store()
        .check_integrity()
        .expect("store should be consistent");
    assert_eq!(stats.notes, 1);
    assert_eq!(stats.attachments, 1);
}

/// Store wrapper that fails attachment writes either before or after
/// delegating to the real store.
struct FaultyStore {
    inner: SqliteStore,
    fault: std::sync::Mutex<Fault>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fault {
    None,
    BeforeWrite,
    AfterWrite,
}

impl FaultyStore {
    fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().expect("store should open"),
            fault: std::sync::Mutex::new(Fault::None),
        }
    }

    fn set_fault(&self, fault: Fault) {
        *self.fault.lock().expect("fault lock") = fault;
    }

    fn around<T>(&self, write: impl FnOnce() -> secretnotes_core::Result<T>) -> secretnotes_core::Result<T> {
        let fault = *self.fault.lock().expect("fault lock");
        if fault == Fault::BeforeWrite {
            return Err(NotesError::Storage("injected failure".to_string()));
        }
        let value = write()?;
        if fault == Fault::AfterWrite {
            return Err(NotesError::Storage("injected failure".to_string()));
        }
        Ok(value)
    }
}

impl NoteStore for FaultyStore {
    fn find_note(&self, token: &LookupToken) -> secretnotes_core::Result<Option<NoteRecord>> {
        self.inner.find_note(token)
    }

    fn insert_note(&self, note: &NewNote) -> secretnotes_core::Result<NoteRecord> {
        self.inner.insert_note(note)
    }

    fn update_note_envelope(
        &self,
        token: &LookupToken,
        sealed: &SealedPayload,
    ) -> secretnotes_core::Result<NoteRecord> {
        self.inner.update_note_envelope(token, sealed)
    }

    fn delete_note(&self, token: &LookupToken) -> secretnotes_core::Result<bool> {
        self.inner.delete_note(token)
    }

    fn find_attachment(&self, token: &LookupToken) -> secretnotes_core::Result<Option<AttachmentRecord>> {
        self.inner.find_attachment(token)
    }

    fn replace_attachment(&self, attachment: &NewAttachment) -> secretnotes_core::Result<AttachmentRecord> {
        self.around(|| self.inner.replace_attachment(attachment))
    }

    fn delete_attachment(&self, token: &LookupToken) -> secretnotes_core::Result<bool> {
        self.around(|| self.inner.delete_attachment(token))
    }

    fn check_integrity(&self) -> secretnotes_core::Result<StoreStats> {
        self.inner.check_integrity()
    }
}

/// A note reports an attachment exactly when one can be fetched.
fn assert_attachment_consistent(service: &NoteService<FaultyStore>, passphrase: &Passphrase) {
    let (note, _) = service
        .get_or_create_note(passphrase)
        .expect("note should open");
    let fetched = service.fetch_file(passphrase);
    assert_eq!(note.has_attachment, fetched.is_ok());
    if let Err(err) = fetched {
        assert!(matches!(err, NotesError::AttachmentNotFound));
    }
    service
        .store()
        .check_integrity()
        .expect("store should stay consistent");
}

#[test]
fn test_failed_attachment_writes_leave_store_consistent() {
    let service = NoteService::new(FaultyStore::new(), ServiceOptions::default());
    let passphrase = Passphrase::from("faulty-store-pass");

    for fault in [Fault::BeforeWrite, Fault::AfterWrite] {
        service.store().set_fault(fault);
        let result = service.attach_file(&passphrase, NewFile::new("hi.txt", "text/plain", b"hi".to_vec()));
        assert!(result.is_err());
        assert_attachment_consistent(&service, &passphrase);
    }

    service.store().set_fault(Fault::None);
    service
        .attach_file(&passphrase, NewFile::new("hi.txt", "text/plain", b"hi".to_vec()))
        .expect("attach should succeed");
    assert_attachment_consistent(&service, &passphrase);

    for fault in [Fault::BeforeWrite, Fault::AfterWrite] {
        service.store().set_fault(fault);
        assert!(service.delete_file(&passphrase).is_err());
        assert_attachment_consistent(&service, &passphrase);
    }
}
