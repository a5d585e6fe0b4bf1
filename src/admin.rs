//! The administrative area owned by every versioned directory.
//!
//! Layout under `<dir>/.wc/`:
//!
//! - `format`     --- single version byte, checked on open
//! - `entries`    --- the directory's entry records
//! - `dir-props`  --- properties of the directory itself
//! - `props/`     --- one property file per child
//! - `text-base/` --- pristine file contents
//! - `tmp/`       --- scratch area, process private
//! - `lock`       --- write lock sentinel while one is held

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Name of the administrative subdirectory.
pub const ADM_DIR: &str = ".wc";

/// Highest administrative format this library understands. Areas written
/// with a higher version are refused.
pub const FORMAT_VERSION: u8 = 1;

const FORMAT_FILE: &str = "format";
const ENTRIES_FILE: &str = "entries";
const LOCK_FILE: &str = "lock";
const DIR_PROPS_FILE: &str = "dir-props";
const PROPS_DIR: &str = "props";
const TEXT_BASE_DIR: &str = "text-base";
const TMP_DIR: &str = "tmp";

/// Handle on one versioned directory's administrative area.
#[derive(Debug, Clone)]
pub struct AdminArea {
    dir: PathBuf,
    adm: PathBuf,
}

impl AdminArea {
    /// Creates a fresh administrative area under `dir` and returns a handle
    /// on it. Fails if one already exists.
    pub fn create(dir: &Path) -> Result<AdminArea> {
        let adm = dir.join(ADM_DIR);
        fs::create_dir(&adm).map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                Error::Io(std::io::Error::new(
                    ErrorKind::AlreadyExists,
                    format!("'{}' already has an administrative area", dir.display()),
                ))
            } else {
                err.into()
            }
        })?;
        fs::create_dir(adm.join(PROPS_DIR))?;
        fs::create_dir(adm.join(TEXT_BASE_DIR))?;
        fs::create_dir(adm.join(TMP_DIR))?;
        fs::create_dir(adm.join(TMP_DIR).join(TEXT_BASE_DIR))?;
        fs::write(adm.join(FORMAT_FILE), [FORMAT_VERSION])?;
        Ok(AdminArea {
            dir: dir.to_path_buf(),
            adm,
        })
    }

    /// Opens the administrative area of `dir`, verifying the format byte.
    pub fn open(dir: &Path) -> Result<AdminArea> {
        let adm = dir.join(ADM_DIR);
        let mut format = fs::File::open(adm.join(FORMAT_FILE)).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::NotAWorkingCopy(dir.to_path_buf())
            } else {
                err.into()
            }
        })?;
        let mut byte = [0u8; 1];
        format.read_exact(&mut byte).map_err(|_| Error::Codec("format file"))?;
        if byte[0] > FORMAT_VERSION {
            return Err(Error::UnsupportedFormat {
                found: byte[0],
                supported: FORMAT_VERSION,
            });
        }
        Ok(AdminArea {
            dir: dir.to_path_buf(),
            adm,
        })
    }

    /// The versioned directory this area belongs to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entries file.
    pub(crate) fn entries_path(&self) -> PathBuf {
        self.adm.join(ENTRIES_FILE)
    }

    /// Path of the property file for the child `name`, or the directory's
    /// own property file for the empty name.
    pub(crate) fn props_path(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            self.adm.join(DIR_PROPS_FILE)
        } else {
            self.adm.join(PROPS_DIR).join(name)
        }
    }

    /// The committed text-base directory.
    pub(crate) fn text_base_dir(&self) -> PathBuf {
        self.adm.join(TEXT_BASE_DIR)
    }

    /// The process-private scratch area.
    pub(crate) fn tmp_dir(&self) -> PathBuf {
        self.adm.join(TMP_DIR)
    }

    /// Takes out the directory's write lock.
    ///
    /// Locks are not reentrant: a second acquisition from any process,
    /// including this one, fails with [`Error::Locked`] until the guard is
    /// dropped.
    pub fn lock(&self) -> Result<WriteLock> {
        let path = self.adm.join(LOCK_FILE);
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(WriteLock {
                dir: self.dir.clone(),
                path,
            }),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                Err(Error::Locked(self.dir.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// True while some process holds the write lock.
    pub fn locked(&self) -> bool {
        self.adm.join(LOCK_FILE).exists()
    }

    /// Writes `content` to `path` through a scratch file in the same
    /// administrative area, so the target is replaced atomically.
    pub(crate) fn write_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(self.tmp_dir())?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| Error::Io(err.error))?;
        Ok(())
    }
}

/// Guard for one directory's write lock. Dropping it releases the lock.
#[derive(Debug)]
pub struct WriteLock {
    dir: PathBuf,
    path: PathBuf,
}

impl WriteLock {
    /// The directory this lock protects.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Fails with [`Error::NotLocked`] unless this guard protects `dir`.
    /// Store mutations call this before touching durable state.
    pub(crate) fn check(&self, dir: &Path) -> Result<()> {
        if self.dir == dir {
            Ok(())
        } else {
            Err(Error::NotLocked(dir.to_path_buf()))
        }
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
