//! Records external references met during a crawl.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The `externals` property values seen on directories during one crawl.
///
/// Each directory with the property set appears in both the before and the
/// after map with the same raw value; a later pass that applies property
/// edits updates only the after map, so a difference between the two maps
/// is exactly the set of changed externals.
#[derive(Debug, Default)]
pub struct TraversalInfo {
    before: BTreeMap<PathBuf, Vec<u8>>,
    after: BTreeMap<PathBuf, Vec<u8>>,
}

impl TraversalInfo {
    pub fn new() -> TraversalInfo {
        TraversalInfo::default()
    }

    /// Records the raw property value of `dir` in both maps.
    pub(crate) fn record(&mut self, dir: &Path, value: &[u8]) {
        self.before.insert(dir.to_path_buf(), value.to_vec());
        self.after.insert(dir.to_path_buf(), value.to_vec());
    }

    /// Replaces the after-value of `dir`, marking its externals as edited.
    pub fn set_after(&mut self, dir: &Path, value: Option<&[u8]>) {
        match value {
            Some(value) => {
                self.after.insert(dir.to_path_buf(), value.to_vec());
            }
            None => {
                self.after.remove(dir);
            }
        }
    }

    pub fn before(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.before
    }

    pub fn after(&self) -> &BTreeMap<PathBuf, Vec<u8>> {
        &self.after
    }

    /// Directories whose externals changed between the two maps.
    pub fn changed(&self) -> Vec<&Path> {
        let mut out: Vec<&Path> = Vec::new();
        for (dir, value) in &self.before {
            if self.after.get(dir) != Some(value) {
                out.push(dir);
            }
        }
        for dir in self.after.keys() {
            if !self.before.contains_key(dir) {
                out.push(dir);
            }
        }
        out.sort();
        out
    }
}
