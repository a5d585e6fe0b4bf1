//! Restores a missing working file from its text-base.

use std::path::Path;

use chrono::{TimeZone, Utc};
use filetime::FileTime;

use crate::admin::AdminArea;
use crate::config::Config;
use crate::entries::{Entry, EntryPatch, EntriesFile, ModifyFields, Timestamp};
use crate::props::PropertySet;
use crate::subst::{self, Keywords, Translation};
use crate::textbase::TextBaseStore;
use crate::Result;

/// Recreates the working file for `entry` from its committed text-base,
/// materialised through the translator per the file's properties.
///
/// The entry's text-time is set to the new working file's mtime (or, with
/// `use_commit_times`, both are set to the last-committed time) so that
/// later modification checks treat the file as unmodified. Conflict
/// artifacts recorded for the entry are cleared: a freshly restored file
/// cannot be in text conflict.
///
/// Takes the directory's write lock for the entry update; fails with
/// [`crate::Error::Locked`] while another process holds it.
pub(super) fn restore_file(area: &AdminArea, config: &Config, entry: &Entry) -> Result<()> {
    let store = TextBaseStore::new(area);
    let path = area.dir().join(&entry.name);
    let props = PropertySet::load(area, &entry.name)?;
    let special = props.special();

    if special {
        subst::materialise_special(&store.read(&entry.name)?, &path)?;
    } else {
        let keywords = match props.keywords_value() {
            Some(value) => Keywords::build(
                value,
                entry
                    .committed_rev
                    .or(entry.revision)
                    .map(|r| r.to_string())
                    .as_deref(),
                entry.url.as_deref(),
                entry.committed_date.map(render_date).as_deref(),
                entry.committed_author.as_deref(),
            ),
            None => Keywords::default(),
        };
        let eol = props.eol_style().working_eol(config.native_eol());
        let translation = Translation::materialise(eol, keywords);
        subst::translate_file(&store.base_path(&entry.name), &path, &translation)?;
    }

    let text_time = if config.use_commit_times && !special {
        match entry.committed_date {
            Some(date) => {
                filetime::set_file_mtime(
                    &path,
                    FileTime::from_unix_time(date.seconds, date.nanos),
                )?;
                date
            }
            None => mtime_of(&path)?,
        }
    } else {
        mtime_of(&path)?
    };

    let lock = area.lock()?;
    let mut entries = EntriesFile::open(area)?;
    let patch = EntryPatch {
        text_time: Some(text_time),
        ..EntryPatch::default()
    };
    entries.modify(
        &lock,
        &entry.name,
        &patch,
        ModifyFields::TEXT_TIME
            | ModifyFields::CONFLICT_OLD
            | ModifyFields::CONFLICT_NEW
            | ModifyFields::CONFLICT_WORKING,
    )?;
    entries.sync(&lock)?;

    tracing::debug!(path = %path.display(), "restored working file");
    Ok(())
}

/// Renders a committed date the way keyword expansion shows it.
fn render_date(date: Timestamp) -> String {
    match Utc.timestamp_opt(date.seconds, date.nanos).single() {
        Some(utc) => utc.format("%Y-%m-%d %H:%M:%SZ").to_string(),
        None => String::new(),
    }
}

fn mtime_of(path: &Path) -> Result<Timestamp> {
    let meta = std::fs::symlink_metadata(path)?;
    let mtime = FileTime::from_last_modification_time(&meta);
    Ok(Timestamp {
        seconds: mtime.unix_seconds(),
        nanos: mtime.nanoseconds(),
    })
}
