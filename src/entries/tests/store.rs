#![cfg(test)]

use crate::admin::AdminArea;
use crate::entries::{
    EntriesFile, Entry, EntryFlags, EntryPatch, Kind, ModifyFields, Schedule, THIS_DIR,
};
use crate::Error;

fn new_area() -> (tempfile::TempDir, AdminArea) {
    let dir = tempfile::tempdir().unwrap();
    let area = AdminArea::create(dir.path()).unwrap();
    (dir, area)
}

fn seed(area: &AdminArea) {
    let lock = area.lock().unwrap();
    let mut file = EntriesFile::create(area, &lock).unwrap();
    let mut this_dir = Entry::new(THIS_DIR, Kind::Directory);
    this_dir.revision = Some(3);
    this_dir.url = Some("http://host/trunk".to_string());
    file.add(&lock, this_dir).unwrap();
    file.add(&lock, Entry::new("beta", Kind::File)).unwrap();
    let mut hidden = Entry::new("ghost", Kind::File);
    hidden.flags = EntryFlags::ABSENT;
    file.add(&lock, hidden).unwrap();
    file.sync(&lock).unwrap();
}

#[test]
fn test_load_filters_hidden() {
    let (_dir, area) = new_area();
    seed(&area);

    let all = EntriesFile::load(&area, true).unwrap();
    assert_eq!(all.len(), 3);

    let visible = EntriesFile::load(&area, false).unwrap();
    assert_eq!(visible.len(), 2);
    assert!(visible.contains_key(THIS_DIR));
    assert!(!visible.contains_key("ghost"));
}

#[test]
fn test_modify_selected_fields_only() {
    let (_dir, area) = new_area();
    seed(&area);

    let lock = area.lock().unwrap();
    let mut file = EntriesFile::open(&area).unwrap();
    let patch = EntryPatch {
        revision: Some(4),
        schedule: Schedule::Delete,
        lock_token: Some("token".to_string()),
        ..EntryPatch::default()
    };
    file.modify(&lock, "beta", &patch, ModifyFields::REVISION)
        .unwrap();
    file.sync(&lock).unwrap();

    let map = EntriesFile::load(&area, true).unwrap();
    let beta = &map["beta"];
    // Only the flagged field moved.
    assert_eq!(beta.revision, Some(4));
    assert_eq!(beta.schedule, Schedule::Normal);
    assert!(beta.lock_token.is_none());
}

#[test]
fn test_modify_unknown_entry() {
    let (_dir, area) = new_area();
    seed(&area);
    let lock = area.lock().unwrap();
    let mut file = EntriesFile::open(&area).unwrap();
    let err = file
        .modify(&lock, "nope", &EntryPatch::default(), ModifyFields::REVISION)
        .unwrap_err();
    assert!(matches!(err, Error::EntryNotFound(_)));
}

#[test]
fn test_mutation_requires_matching_lock() {
    let (_dir, area) = new_area();
    seed(&area);

    let other_dir = tempfile::tempdir().unwrap();
    let other_area = AdminArea::create(other_dir.path()).unwrap();
    let wrong_lock = other_area.lock().unwrap();

    let mut file = EntriesFile::open(&area).unwrap();
    let err = file
        .add(&wrong_lock, Entry::new("new", Kind::File))
        .unwrap_err();
    assert!(matches!(err, Error::NotLocked(_)));
}

#[test]
fn test_sync_refreshes_cache() {
    let (_dir, area) = new_area();
    seed(&area);
    // Prime the cache.
    assert_eq!(EntriesFile::load(&area, true).unwrap().len(), 3);

    let lock = area.lock().unwrap();
    let mut file = EntriesFile::open(&area).unwrap();
    file.remove(&lock, "ghost").unwrap();
    file.sync(&lock).unwrap();

    assert_eq!(EntriesFile::load(&area, true).unwrap().len(), 2);
}

#[test]
fn test_walk_is_name_ordered() {
    let (_dir, area) = new_area();
    seed(&area);
    let file = EntriesFile::open(&area).unwrap();
    let mut names = Vec::new();
    file.walk(true, |name, _| {
        names.push(name.to_string());
        Ok(())
    })
    .unwrap();
    assert_eq!(names, ["", "beta", "ghost"]);
}
