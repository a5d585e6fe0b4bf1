//! Durable storage and caching for one directory's entries.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use moka::sync::Cache;

use super::{codec, EntriesMap, Entry, EntryPatch, ModifyFields, THIS_DIR};
use crate::admin::{AdminArea, WriteLock};
use crate::{Error, Result};

/// Read cache of decoded entries files, shared process-wide and keyed by
/// directory. Writers refresh it on sync; the cached maps themselves are
/// immutable.
fn cache() -> &'static Cache<PathBuf, Arc<EntriesMap>> {
    static CACHE: OnceLock<Cache<PathBuf, Arc<EntriesMap>>> = OnceLock::new();
    CACHE.get_or_init(|| Cache::new(256))
}

/// One directory's entries, loaded for modification.
///
/// Mutations stage in memory and reach disk only on [`EntriesFile::sync`].
/// Every mutating call demands the directory's [`WriteLock`]; plain reads
/// go through [`EntriesFile::load`] and the shared cache instead.
#[derive(Debug)]
pub struct EntriesFile {
    area: AdminArea,
    map: EntriesMap,
    dirty: bool,
}

impl EntriesFile {
    /// Reads the entries of `area` through the cache.
    ///
    /// With `show_hidden` unset, entries flagged deleted or absent are
    /// filtered out --- except the self-entry, which every caller needs for
    /// the directory's own URL and revision.
    pub fn load(area: &AdminArea, show_hidden: bool) -> Result<Arc<EntriesMap>> {
        let full = match cache().get(&area.dir().to_path_buf()) {
            Some(map) => map,
            None => {
                let map = Arc::new(read_from_disk(area)?);
                cache().insert(area.dir().to_path_buf(), Arc::clone(&map));
                map
            }
        };
        if show_hidden || full.values().all(|e| !e.hidden() || e.name == THIS_DIR) {
            return Ok(full);
        }
        let visible: EntriesMap = full
            .iter()
            .filter(|(name, e)| !e.hidden() || name.as_str() == THIS_DIR)
            .map(|(name, e)| (name.clone(), e.clone()))
            .collect();
        Ok(Arc::new(visible))
    }

    /// Opens the entries of `area` for modification.
    pub fn open(area: &AdminArea) -> Result<EntriesFile> {
        Ok(EntriesFile {
            map: read_from_disk(area)?,
            area: area.clone(),
            dirty: false,
        })
    }

    /// Creates an initially empty entries file for a fresh area.
    pub fn create(area: &AdminArea, lock: &WriteLock) -> Result<EntriesFile> {
        let mut file = EntriesFile {
            area: area.clone(),
            map: EntriesMap::new(),
            dirty: true,
        };
        file.sync(lock)?;
        Ok(file)
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.map.get(name)
    }

    /// The self-entry, if the file has been populated at all.
    pub fn this_dir(&self) -> Option<&Entry> {
        self.map.get(THIS_DIR)
    }

    /// Inserts or replaces a whole entry.
    pub fn add(&mut self, lock: &WriteLock, entry: Entry) -> Result<()> {
        lock.check(self.area.dir())?;
        self.map.insert(entry.name.clone(), entry);
        self.dirty = true;
        Ok(())
    }

    /// Updates the fields of `name` selected by `fields` from `patch`.
    pub fn modify(
        &mut self,
        lock: &WriteLock,
        name: &str,
        patch: &EntryPatch,
        fields: ModifyFields,
    ) -> Result<()> {
        lock.check(self.area.dir())?;
        let entry = self
            .map
            .get_mut(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        patch.apply(entry, fields);
        self.dirty = true;
        Ok(())
    }

    /// Removes the entry for `name`.
    pub fn remove(&mut self, lock: &WriteLock, name: &str) -> Result<()> {
        lock.check(self.area.dir())?;
        self.map
            .remove(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?;
        self.dirty = true;
        Ok(())
    }

    /// Writes pending modifications durably and refreshes the read cache.
    pub fn sync(&mut self, lock: &WriteLock) -> Result<()> {
        lock.check(self.area.dir())?;
        if !self.dirty {
            return Ok(());
        }
        let mut buf = Vec::new();
        codec::write_map(&mut buf, &self.map)?;
        self.area.write_atomic(&self.area.entries_path(), &buf)?;
        cache().insert(self.area.dir().to_path_buf(), Arc::new(self.map.clone()));
        self.dirty = false;
        Ok(())
    }

    /// Invokes `callback` once per entry, self-entry included, in name
    /// order. Hidden entries appear only when `include_hidden` is set.
    pub fn walk(
        &self,
        include_hidden: bool,
        mut callback: impl FnMut(&str, &Entry) -> Result<()>,
    ) -> Result<()> {
        for (name, entry) in &self.map {
            if !include_hidden && entry.hidden() && name != THIS_DIR {
                continue;
            }
            callback(name, entry)?;
        }
        Ok(())
    }
}

fn read_from_disk(area: &AdminArea) -> Result<EntriesMap> {
    match std::fs::File::open(area.entries_path()) {
        Ok(mut file) => codec::read_map(&mut file)
            .map_err(|err| err.wrap(format!("while reading entries of '{}'", area.dir().display()))),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(EntriesMap::new()),
        Err(err) => Err(err.into()),
    }
}
