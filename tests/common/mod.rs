//! Shared fixtures: an on-disk working copy builder and a recording
//! update consumer.

#![allow(dead_code)]

use std::path::Path;

use async_trait::async_trait;

use workcopy::admin::AdminArea;
use workcopy::entries::{EntriesFile, Entry, Kind, Revnum, THIS_DIR};
use workcopy::props::PropertySet;
use workcopy::reporter::Consumer;
use workcopy::textbase::{digest_of, TextBaseStore};
use workcopy::Result;

/// Hooks test logging up to `RUST_LOG`, once per process.
pub fn init_tracing() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// One consumer invocation, as the recording consumer saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Set {
        path: String,
        revision: Revnum,
        start_empty: bool,
        lock_token: Option<String>,
    },
    Link {
        path: String,
        url: String,
        revision: Revnum,
        start_empty: bool,
        lock_token: Option<String>,
    },
    Delete {
        path: String,
    },
    Finish,
    Abort,
}

/// Consumer that records every call.
#[derive(Debug, Default)]
pub struct Recording {
    pub calls: Vec<Call>,
    /// When set, the call with this ordinal fails.
    pub fail_at: Option<usize>,
}

impl Recording {
    pub fn new() -> Recording {
        Recording::default()
    }

    fn push(&mut self, call: Call) -> Result<()> {
        self.calls.push(call);
        if self.fail_at == Some(self.calls.len()) {
            return Err(std::io::Error::other("consumer failure").into());
        }
        Ok(())
    }
}

#[async_trait]
impl Consumer for Recording {
    async fn set_path(
        &mut self,
        path: &str,
        revision: Revnum,
        start_empty: bool,
        lock_token: Option<&str>,
    ) -> Result<()> {
        self.push(Call::Set {
            path: path.to_string(),
            revision,
            start_empty,
            lock_token: lock_token.map(str::to_string),
        })
    }

    async fn link_path(
        &mut self,
        path: &str,
        url: &str,
        revision: Revnum,
        start_empty: bool,
        lock_token: Option<&str>,
    ) -> Result<()> {
        self.push(Call::Link {
            path: path.to_string(),
            url: url.to_string(),
            revision,
            start_empty,
            lock_token: lock_token.map(str::to_string),
        })
    }

    async fn delete_path(&mut self, path: &str) -> Result<()> {
        self.push(Call::Delete {
            path: path.to_string(),
        })
    }

    async fn finish_report(&mut self) -> Result<()> {
        self.push(Call::Finish)
    }

    async fn abort_report(&mut self) -> Result<()> {
        self.push(Call::Abort)
    }
}

/// Builds versioned directories on disk for reporter tests.
pub struct WcBuilder {
    area: AdminArea,
}

impl WcBuilder {
    /// Turns `dir` into a versioned directory at `url`/`revision`.
    pub fn init(dir: &Path, url: &str, revision: Revnum) -> WcBuilder {
        std::fs::create_dir_all(dir).unwrap();
        let area = AdminArea::create(dir).unwrap();
        let lock = area.lock().unwrap();
        let mut entries = EntriesFile::create(&area, &lock).unwrap();
        let mut this_dir = Entry::new(THIS_DIR, Kind::Directory);
        this_dir.revision = Some(revision);
        this_dir.url = Some(url.to_string());
        entries.add(&lock, this_dir).unwrap();
        entries.sync(&lock).unwrap();
        WcBuilder { area }
    }

    pub fn area(&self) -> &AdminArea {
        &self.area
    }

    pub fn dir(&self) -> &Path {
        self.area.dir()
    }

    /// Adds a versioned file with working copy content and a matching
    /// text-base.
    pub fn file(&self, entry: Entry, content: &[u8]) -> &Self {
        self.file_with_base(entry, content, content)
    }

    /// Adds a versioned file whose working copy content differs from its
    /// text-base.
    pub fn file_with_base(&self, mut entry: Entry, base: &[u8], working: &[u8]) -> &Self {
        let store = TextBaseStore::new(&self.area);
        store.write_temp(&entry.name, base).unwrap();
        store.commit_temp(&entry.name).unwrap();
        entry.checksum = Some(digest_of(base));
        std::fs::write(self.dir().join(&entry.name), working).unwrap();
        self.add(entry)
    }

    /// Adds a versioned file with a text-base but no working file.
    pub fn missing_file(&self, mut entry: Entry, base: &[u8]) -> &Self {
        let store = TextBaseStore::new(&self.area);
        store.write_temp(&entry.name, base).unwrap();
        store.commit_temp(&entry.name).unwrap();
        entry.checksum = Some(digest_of(base));
        self.add(entry)
    }

    /// Adds an entry record without touching disk.
    pub fn add(&self, entry: Entry) -> &Self {
        let lock = self.area.lock().unwrap();
        let mut entries = EntriesFile::open(&self.area).unwrap();
        entries.add(&lock, entry).unwrap();
        entries.sync(&lock).unwrap();
        self
    }

    /// Stores properties for a child (empty name: the directory itself).
    pub fn props(&self, name: &str, props: &PropertySet) -> &Self {
        props.store(&self.area, name).unwrap();
        self
    }

    /// Creates a versioned subdirectory.
    pub fn subdir(&self, entry: Entry, url: &str, revision: Revnum) -> WcBuilder {
        let name = entry.name.clone();
        self.add(entry);
        WcBuilder::init(&self.dir().join(name), url, revision)
    }
}

/// File entry at `revision` under its parent's URL.
pub fn file_entry(name: &str, parent_url: &str, revision: Revnum) -> Entry {
    let mut entry = Entry::new(name, Kind::File);
    entry.revision = Some(revision);
    entry.url = Some(format!("{parent_url}/{name}"));
    entry
}

/// Directory entry at `revision` under its parent's URL.
pub fn dir_entry(name: &str, parent_url: &str, revision: Revnum) -> Entry {
    let mut entry = Entry::new(name, Kind::Directory);
    entry.revision = Some(revision);
    entry.url = Some(format!("{parent_url}/{name}"));
    entry
}
