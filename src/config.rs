//! Runtime configuration for working copy operations.
//!
//! There is no process-wide configuration: a [`Config`] is loaded once by
//! the caller and passed explicitly to the operations that consult it.

use std::path::Path;

use serde::Deserialize;

use crate::subst::TargetEol;
use crate::{Error, Result};

/// Working copy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Overrides the platform terminator used for `eol-style=native`.
    /// One of `"LF"`, `"CR"`, `"CRLF"`. Unset means the platform default.
    pub native_eol: Option<String>,

    /// Restore files with their last-committed time as mtime instead of the
    /// time of restoration.
    pub use_commit_times: bool,
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Config> {
        toml::from_str(text).map_err(|_| Error::Codec("configuration"))
    }

    /// Loads a configuration file, treating a missing file as defaults.
    pub fn load(path: &Path) -> Result<Config> {
        match std::fs::read_to_string(path) {
            Ok(text) => Config::from_toml(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// The terminator written for `eol-style=native`.
    pub fn native_eol(&self) -> TargetEol {
        match self.native_eol.as_deref() {
            Some("CR") => TargetEol::Cr,
            Some("CRLF") => TargetEol::Crlf,
            Some("LF") => TargetEol::Lf,
            _ => TargetEol::platform(),
        }
    }
}
