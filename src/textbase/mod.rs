//! Defines the pristine text-base store --- [`TextBaseStore`].
//!
//! For each versioned file the store holds the canonical form of its
//! last-known repository revision, and transiently a temporary successor
//! while an update or local change is in flight. Committing the temporary
//! is a same-filesystem rename: a crash leaves either the old or the new
//! text-base, never a truncated one.

#[cfg(test)]
mod tests;

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use md5::{Digest, Md5};

use crate::admin::AdminArea;
use crate::{Error, Result};

const BASE_EXT: &str = "base";

/// Length of the text-base digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// Digest computation reads in chunks of this size.
const CHUNK_SIZE: usize = 4096;

/// The text-base store of one versioned directory.
#[derive(Debug)]
pub struct TextBaseStore {
    committed: PathBuf,
    temp: PathBuf,
}

impl TextBaseStore {
    pub fn new(area: &AdminArea) -> TextBaseStore {
        TextBaseStore {
            committed: area.text_base_dir(),
            temp: area.tmp_dir().join("text-base"),
        }
    }

    fn committed_path(&self, name: &str) -> PathBuf {
        self.committed.join(format!("{name}.{BASE_EXT}"))
    }

    /// Path of the committed text-base, for callers that stream it through
    /// a file-to-file translation.
    pub(crate) fn base_path(&self, name: &str) -> PathBuf {
        self.committed_path(name)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.temp.join(format!("{name}.{BASE_EXT}"))
    }

    /// True when a committed text-base exists for `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.committed_path(name).exists()
    }

    /// Opens the committed text-base of `name` for reading.
    pub fn open(&self, name: &str) -> Result<fs::File> {
        fs::File::open(self.committed_path(name)).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::EntryNotFound(name.to_string())
            } else {
                err.into()
            }
        })
    }

    /// Reads the committed text-base of `name` whole.
    pub fn read(&self, name: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.open(name)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Opens a writable temporary text-base for `name`, replacing any
    /// previous temporary.
    pub fn open_temp(&self, name: &str) -> Result<fs::File> {
        Ok(fs::File::create(self.temp_path(name))?)
    }

    /// Writes `content` as the temporary text-base for `name`.
    pub fn write_temp(&self, name: &str, content: &[u8]) -> Result<()> {
        let mut file = self.open_temp(name)?;
        file.write_all(content)?;
        file.sync_all()?;
        Ok(())
    }

    /// Atomically replaces the committed text-base of `name` with its
    /// temporary.
    pub fn commit_temp(&self, name: &str) -> Result<()> {
        fs::rename(self.temp_path(name), self.committed_path(name))?;
        Ok(())
    }

    /// Removes the temporary text-base of `name`, if present.
    pub fn discard_temp(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.temp_path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// MD5 digest of the committed text-base of `name`, streamed.
    pub fn checksum(&self, name: &str) -> Result<[u8; DIGEST_LEN]> {
        let mut file = self.open(name)?;
        let mut hasher = Md5::new();
        let mut buf = [0u8; CHUNK_SIZE];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize().into())
    }

    /// Recomputes the digest of `name` and compares it with `expected`.
    ///
    /// A mismatch is fatal [`Error::CorruptTextBase`]; callers must not
    /// quietly continue without the text-base.
    pub fn verify(&self, name: &str, expected: &[u8; DIGEST_LEN]) -> Result<()> {
        let actual = self.checksum(name)?;
        if &actual == expected {
            Ok(())
        } else {
            Err(Error::CorruptTextBase {
                path: self.committed_path(name),
                expected: hex(expected),
                actual: hex(&actual),
            })
        }
    }

    /// Removes both blobs of `name`.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.discard_temp(name)?;
        match fs::remove_file(self.committed_path(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Lowercase hex rendering of a digest.
pub fn hex(digest: &[u8; DIGEST_LEN]) -> String {
    let mut out = String::with_capacity(DIGEST_LEN * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// MD5 digest of an in-memory byte string.
pub fn digest_of(content: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = Md5::new();
    hasher.update(content);
    hasher.finalize().into()
}
