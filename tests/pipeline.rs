//! Exercises the stores, the translator and the merge engine together the
//! way an update uses them.

mod common;

use common::{file_entry, WcBuilder};

use workcopy::cancel::NeverCancel;
use workcopy::entries::EntriesFile;
use workcopy::merge::{merge, MergeLabels};
use workcopy::subst::{translate_bytes, Keywords, TargetEol, Translation};
use workcopy::textbase::{digest_of, TextBaseStore};
use workcopy::Error;

const URL: &str = "http://host/trunk";

#[test]
fn test_update_merges_local_edit_with_incoming_change() {
    let tmp = tempfile::tempdir().unwrap();
    let wc = WcBuilder::init(tmp.path(), URL, 1);

    // Canonical text-base at revision 1; the working file carries CRLF
    // terminators and a local edit on top.
    let base = b"Aa\nBb\nCc\n";
    let working_form = Translation::materialise(Some(TargetEol::Crlf), Keywords::default());
    let working = translate_bytes(b"Aa\nBb\nCc\nlocal\n", &working_form).unwrap();
    wc.file_with_base(file_entry("subject", URL, 1), base, &working);

    let store = TextBaseStore::new(wc.area());
    let entries = EntriesFile::load(wc.area(), true).unwrap();
    let recorded = entries["subject"].checksum.unwrap();

    // Before transmitting anything against the text-base, prove it.
    store.verify("subject", &recorded).unwrap();

    // Canonicalise the working file, fold in the incoming change, and
    // rematerialise.
    let on_disk = std::fs::read(wc.dir().join("subject")).unwrap();
    let mine =
        translate_bytes(&on_disk, &Translation::canonicalise(Keywords::default(), false)).unwrap();
    let incoming = b"Aa changed\nBb\nCc\n";
    let result = merge(
        base,
        incoming,
        &mine,
        &MergeLabels::default(),
        &NeverCancel,
    )
    .unwrap();
    assert!(!result.conflicted);
    assert_eq!(result.output, b"Aa changed\nBb\nCc\nlocal\n");

    let new_working = translate_bytes(&result.output, &working_form).unwrap();
    std::fs::write(wc.dir().join("subject"), &new_working).unwrap();

    // The new text-base lands through the temporary and survives a
    // checksum round trip.
    store.write_temp("subject", incoming).unwrap();
    store.commit_temp("subject").unwrap();
    assert_eq!(store.checksum("subject").unwrap(), digest_of(incoming));
}

#[test]
fn test_update_conflict_carries_markers_into_working_form() {
    let base = b"Aa\nBb\n";
    let incoming = b"theirs\nBb\n";
    let mine = b"ours\nBb\n";

    let result = merge(base, incoming, mine, &MergeLabels::default(), &NeverCancel).unwrap();
    assert!(result.conflicted);

    // Conflict markers survive materialisation like any other text.
    let working = translate_bytes(
        &result.output,
        &Translation::materialise(Some(TargetEol::Crlf), Keywords::default()),
    )
    .unwrap();
    assert_eq!(
        working,
        b"<<<<<<< mine\r\ntheirs\r\n=======\r\nours\r\n>>>>>>> theirs\r\nBb\r\n"
    );
}

#[test]
fn test_corrupt_text_base_is_fatal_before_transmission() {
    let tmp = tempfile::tempdir().unwrap();
    let wc = WcBuilder::init(tmp.path(), URL, 1);
    wc.file(file_entry("damaged", URL, 1), b"contents\n");

    // Something scribbled over the pristine copy.
    let store = TextBaseStore::new(wc.area());
    store.write_temp("damaged", b"scribble\n").unwrap();
    store.commit_temp("damaged").unwrap();

    let entries = EntriesFile::load(wc.area(), true).unwrap();
    let recorded = entries["damaged"].checksum.unwrap();
    let err = store.verify("damaged", &recorded).unwrap_err();
    assert!(matches!(err, Error::CorruptTextBase { .. }));
}
