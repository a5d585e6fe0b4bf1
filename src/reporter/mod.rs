//! Describes the working copy to an update consumer --- [`Reporter`].
//!
//! An update begins with a crawl: the reporter walks the tree depth-first
//! and tells the [`Consumer`] which revision every item is at, which items
//! are switched to foreign URLs, and which are locally absent. The
//! consumer uses that description to compute the minimal edit bringing the
//! tree to the target revision.

mod consumer;
mod restore;
mod traversal;

use std::future::Future;
use std::io::ErrorKind;
use std::path::Path;
use std::pin::Pin;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::admin::AdminArea;
use crate::cancel::{self, Cancel};
use crate::config::Config;
use crate::entries::{EntriesFile, Entry, Kind, Revnum, Schedule, THIS_DIR};
use crate::props::{PropertySet, PROP_EXTERNALS};
use crate::{Error, Result};

pub use consumer::Consumer;
pub use traversal::TraversalInfo;

/// Bytes escaped when a child name joins its parent's URL.
const URL_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Options of one reporter run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Recreate unexpectedly missing working files from their text-base.
    pub restore_files: bool,
    /// Descend into subdirectories.
    pub recurse: bool,
}

impl Default for ReportOptions {
    fn default() -> ReportOptions {
        ReportOptions {
            restore_files: true,
            recurse: true,
        }
    }
}

/// One crawl of a working copy tree against a [`Consumer`].
///
/// The collaborators are borrowed for the duration of the run; [`drive`]
/// consumes the reporter, so a new one is built per report.
///
/// [`drive`]: Reporter::drive
pub struct Reporter<'a, C: Consumer> {
    consumer: &'a mut C,
    config: &'a Config,
    cancel: &'a dyn Cancel,
    options: ReportOptions,
    notify: Option<&'a mut dyn FnMut(&Path)>,
    traversal: Option<&'a mut TraversalInfo>,
}

impl<'a, C: Consumer> Reporter<'a, C> {
    pub fn new(consumer: &'a mut C, config: &'a Config, cancel: &'a dyn Cancel) -> Self {
        Reporter {
            consumer,
            config,
            cancel,
            options: ReportOptions::default(),
            notify: None,
            traversal: None,
        }
    }

    pub fn options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// Invoked once per file restored from its text-base.
    pub fn notify(mut self, notify: &'a mut dyn FnMut(&Path)) -> Self {
        self.notify = Some(notify);
        self
    }

    /// Collects `externals` property values met during the crawl.
    pub fn traversal(mut self, traversal: &'a mut TraversalInfo) -> Self {
        self.traversal = Some(traversal);
        self
    }

    /// Walks the working copy at `path` and reports it to the consumer.
    ///
    /// On success the consumer sees `finish_report` as the last call; on
    /// any failure it sees `abort_report` and the original error is
    /// surfaced, with an abort failure chained onto it if one occurred.
    pub async fn drive(mut self, path: &Path) -> Result<()> {
        match self.report(path).await {
            Ok(()) => self.consumer.finish_report().await,
            Err(err) => {
                tracing::debug!(error = %err, "aborting report");
                Err(match self.consumer.abort_report().await {
                    Ok(()) => err,
                    Err(abort_err) => err.also(abort_err.wrap("error aborting report")),
                })
            }
        }
    }

    async fn report(&mut self, path: &Path) -> Result<()> {
        cancel::check(self.cancel)?;

        let dir_area = match AdminArea::open(path) {
            Ok(area) => Some(area),
            Err(Error::NotAWorkingCopy(_)) => None,
            Err(err) => return Err(err),
        };
        let entry: Option<Entry> = match &dir_area {
            Some(area) => EntriesFile::load(area, true)?.get(THIS_DIR).cloned(),
            None => {
                let parent = parent_area(path)?;
                let name = file_name(path)?;
                EntriesFile::load(&parent, true)?.get(name).cloned()
            }
        };

        // A root that is scheduled for addition or not versioned at all:
        // report it at the parent's revision and let the consumer replace
        // the whole subtree.
        let entry = match entry {
            Some(entry) if !(entry.schedule == Schedule::Add && entry.kind == Kind::Directory) => {
                entry
            }
            _ => {
                let parent = parent_area(path)?;
                let parent_entry = self_entry(&parent)?;
                let base_rev = parent_entry.revision.unwrap_or(0);
                self.consumer.set_path("", base_rev, true, None).await?;
                self.consumer.delete_path("").await?;
                return Ok(());
            }
        };

        let base_rev = match entry.revision {
            Some(rev) => rev,
            None => self_entry(&parent_area(path)?)?.revision.unwrap_or(0),
        };

        // The first report positions the root itself.
        self.consumer
            .set_path("", base_rev, entry.incomplete(), entry.lock_token.as_deref())
            .await?;

        let missing = entry.schedule != Schedule::Delete && disk_kind(path)?.is_none();

        match entry.kind {
            Kind::Directory => match dir_area {
                Some(area) if !missing => {
                    self.report_directory(area, String::new(), base_rev, entry.incomplete())
                        .await?;
                }
                _ => {
                    // Directories cannot be recreated locally.
                    self.consumer.delete_path("").await?;
                }
            },
            Kind::File | Kind::Unknown => {
                let parent = parent_area(path)?;
                if missing
                    && self.options.restore_files
                    && entry.schedule != Schedule::Delete
                    && entry.schedule != Schedule::Replace
                {
                    restore::restore_file(&parent, self.config, &entry)?;
                    if let Some(notify) = self.notify.as_deref_mut() {
                        notify(path);
                    }
                }
                let parent_entry = self_entry(&parent)?;
                let encoded_name = uri_encode(file_name(path)?);
                let expected = parent_entry
                    .url
                    .as_deref()
                    .map(|u| url_join(u, &encoded_name));
                let lock = entry.lock_token.as_deref();
                if expected.is_some() && entry.url.is_some() && entry.url != expected {
                    self.consumer
                        .link_path(
                            "",
                            entry.url.as_deref().unwrap_or(""),
                            entry.revision.unwrap_or(base_rev),
                            false,
                            lock,
                        )
                        .await?;
                } else if entry.revision != Some(base_rev) || entry.lock_token.is_some() {
                    self.consumer.set_path("", base_rev, false, lock).await?;
                }
            }
        }
        Ok(())
    }

    /// Depth-first recursion over one directory's entries.
    ///
    /// With `report_everything` set (the parent was reported start-empty),
    /// every surviving child is reported unconditionally, since the
    /// consumer assumes no children exist.
    fn report_directory(
        &mut self,
        area: AdminArea,
        dir_path: String,
        dir_rev: Revnum,
        report_everything: bool,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + '_>> {
        Box::pin(async move {
            let entries = EntriesFile::load(&area, true)?;
            let dot_entry = entries
                .get(THIS_DIR)
                .cloned()
                .ok_or_else(|| Error::NotAWorkingCopy(area.dir().to_path_buf()))?;

            if self.traversal.is_some() {
                let props = PropertySet::load(&area, THIS_DIR)?;
                if let Some(value) = props.get(PROP_EXTERNALS) {
                    if let Some(info) = self.traversal.as_deref_mut() {
                        info.record(area.dir(), value);
                    }
                }
            }

            for (name, entry) in entries.iter() {
                let name = name.as_str();
                if name == THIS_DIR {
                    continue;
                }
                cancel::check(self.cancel)?;

                let this_url = dot_entry
                    .url
                    .as_deref()
                    .map(|u| url_join(u, &uri_encode(name)));
                let this_path = join_relpath(&dir_path, name);
                let this_full_path = area.dir().join(name);

                // Deleted and absent entries are gone locally; tell the
                // consumer unless it already assumes nothing exists.
                if entry.deleted() || entry.absent() {
                    if !report_everything {
                        self.consumer.delete_path(&this_path).await?;
                    }
                    continue;
                }

                let on_disk = disk_kind(&this_full_path)?;
                let missing = on_disk.is_none();

                // Additions have nothing reportable yet.
                if entry.schedule == Schedule::Add {
                    continue;
                }

                match entry.kind {
                    Kind::File | Kind::Unknown => {
                        if !missing && on_disk != Some(Kind::File) && !report_everything {
                            // Wrong kind on disk; report it missing and let
                            // the consumer's edit run into the obstruction.
                            self.consumer.delete_path(&this_path).await?;
                            continue;
                        }

                        if missing
                            && self.options.restore_files
                            && entry.schedule != Schedule::Delete
                            && entry.schedule != Schedule::Replace
                        {
                            restore::restore_file(&area, self.config, entry)?;
                            if let Some(notify) = self.notify.as_deref_mut() {
                                notify(&this_full_path);
                            }
                        }

                        let revision = entry.revision.unwrap_or(dir_rev);
                        let lock = entry.lock_token.as_deref();
                        let switched = this_url.is_some()
                            && entry.url.is_some()
                            && entry.url != this_url;
                        if report_everything {
                            if switched {
                                self.consumer
                                    .link_path(
                                        &this_path,
                                        entry.url.as_deref().unwrap_or(""),
                                        revision,
                                        false,
                                        lock,
                                    )
                                    .await?;
                            } else {
                                self.consumer
                                    .set_path(&this_path, revision, false, lock)
                                    .await?;
                            }
                        } else if switched && entry.schedule != Schedule::Replace {
                            self.consumer
                                .link_path(
                                    &this_path,
                                    entry.url.as_deref().unwrap_or(""),
                                    revision,
                                    false,
                                    lock,
                                )
                                .await?;
                        } else if entry.revision != Some(dir_rev) || entry.lock_token.is_some() {
                            self.consumer
                                .set_path(&this_path, revision, false, lock)
                                .await?;
                        }
                    }
                    Kind::Directory if self.options.recurse => {
                        if missing {
                            if !report_everything {
                                self.consumer.delete_path(&this_path).await?;
                            }
                            continue;
                        }
                        if on_disk != Some(Kind::Directory) {
                            // A versioned directory turned into something
                            // else cannot take updates at all.
                            return Err(Error::ObstructedUpdate(this_full_path));
                        }

                        // The directory's own self-entry is authoritative
                        // for its revision, URL and completeness.
                        let subdir_area = AdminArea::open(&this_full_path)?;
                        let subdir_entry = EntriesFile::load(&subdir_area, true)?
                            .get(THIS_DIR)
                            .cloned()
                            .unwrap_or_else(|| entry.clone());

                        let revision = subdir_entry.revision.unwrap_or(dir_rev);
                        let lock = subdir_entry.lock_token.clone();
                        let start_empty = subdir_entry.incomplete();
                        let switched = this_url.is_some()
                            && subdir_entry.url.is_some()
                            && subdir_entry.url != this_url;

                        if switched {
                            self.consumer
                                .link_path(
                                    &this_path,
                                    subdir_entry.url.as_deref().unwrap_or(""),
                                    revision,
                                    start_empty,
                                    lock.as_deref(),
                                )
                                .await?;
                        } else if report_everything
                            || subdir_entry.revision != Some(dir_rev)
                            || subdir_entry.lock_token.is_some()
                            || start_empty
                        {
                            self.consumer
                                .set_path(&this_path, revision, start_empty, lock.as_deref())
                                .await?;
                        }

                        self.report_directory(subdir_area, this_path, revision, start_empty)
                            .await?;
                    }
                    Kind::Directory => {}
                }
            }
            Ok(())
        })
    }
}

/// The administrative area of `path`'s parent directory.
fn parent_area(path: &Path) -> Result<AdminArea> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| Error::NotAWorkingCopy(path.to_path_buf()))?;
    AdminArea::open(parent)
}

/// The self-entry of `area`.
fn self_entry(area: &AdminArea) -> Result<Entry> {
    EntriesFile::load(area, true)?
        .get(THIS_DIR)
        .cloned()
        .ok_or_else(|| Error::NotAWorkingCopy(area.dir().to_path_buf()))
}

fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::EntryNotFound(path.display().to_string()))
}

/// Kind of the object on disk, if any. Symlinks count as files.
fn disk_kind(path: &Path) -> Result<Option<Kind>> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(Some(Kind::Directory)),
        Ok(_) => Ok(Some(Kind::File)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn uri_encode(name: &str) -> String {
    utf8_percent_encode(name, URL_ESCAPE).to_string()
}

fn url_join(base: &str, component: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), component)
}

fn join_relpath(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
