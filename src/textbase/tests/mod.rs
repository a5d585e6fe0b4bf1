#![cfg(test)]

use crate::admin::AdminArea;
use crate::textbase::{digest_of, hex, TextBaseStore};
use crate::Error;

fn new_store() -> (tempfile::TempDir, TextBaseStore) {
    let dir = tempfile::tempdir().unwrap();
    let area = AdminArea::create(dir.path()).unwrap();
    (dir, TextBaseStore::new(&area))
}

#[test]
fn test_temp_commit_round_trip() {
    let (_dir, store) = new_store();
    assert!(!store.exists("alpha.c"));

    store.write_temp("alpha.c", b"int main(void);\n").unwrap();
    assert!(!store.exists("alpha.c"));

    store.commit_temp("alpha.c").unwrap();
    assert!(store.exists("alpha.c"));
    assert_eq!(store.read("alpha.c").unwrap(), b"int main(void);\n");
}

#[test]
fn test_commit_replaces_previous() {
    let (_dir, store) = new_store();
    store.write_temp("f", b"old").unwrap();
    store.commit_temp("f").unwrap();
    store.write_temp("f", b"new").unwrap();
    store.commit_temp("f").unwrap();
    assert_eq!(store.read("f").unwrap(), b"new");
}

#[test]
fn test_discard_temp_keeps_committed() {
    let (_dir, store) = new_store();
    store.write_temp("f", b"committed").unwrap();
    store.commit_temp("f").unwrap();
    store.write_temp("f", b"scratch").unwrap();
    store.discard_temp("f").unwrap();
    assert_eq!(store.read("f").unwrap(), b"committed");
    // Discarding again is fine.
    store.discard_temp("f").unwrap();
}

#[test]
fn test_checksum_matches_digest() {
    let (_dir, store) = new_store();
    let content = b"The quick brown fox jumps over the lazy dog";
    store.write_temp("fox", content).unwrap();
    store.commit_temp("fox").unwrap();

    let sum = store.checksum("fox").unwrap();
    assert_eq!(sum, digest_of(content));
    assert_eq!(hex(&sum), "9e107d9d372bb6826bd81d3542a419d6");
}

#[test]
fn test_verify_detects_corruption() {
    let (_dir, store) = new_store();
    store.write_temp("f", b"pristine").unwrap();
    store.commit_temp("f").unwrap();

    store.verify("f", &digest_of(b"pristine")).unwrap();
    let err = store.verify("f", &digest_of(b"tampered")).unwrap_err();
    assert!(matches!(err, Error::CorruptTextBase { .. }));
}

#[test]
fn test_missing_read_is_entry_not_found() {
    let (_dir, store) = new_store();
    assert!(matches!(
        store.read("absent").unwrap_err(),
        Error::EntryNotFound(_)
    ));
}

#[test]
fn test_delete_removes_both() {
    let (_dir, store) = new_store();
    store.write_temp("f", b"x").unwrap();
    store.commit_temp("f").unwrap();
    store.write_temp("f", b"y").unwrap();
    store.delete("f").unwrap();
    assert!(!store.exists("f"));
    // Deleting a missing text-base stays quiet.
    store.delete("f").unwrap();
}
