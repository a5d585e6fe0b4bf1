//! Defines the crate-wide error type [`Error`].

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result of working copy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Working copy errors.
///
/// Wrapping an error with [`Error::wrap`] adds context (which path, which
/// operation) without changing its kind; callers that dispatch on the kind
/// should look through the wrapping with [`Error::root`].
#[derive(Debug, Error)]
pub enum Error {
    /// The input mixes line-terminator styles and repair was not requested.
    #[error("inconsistent line ending style")]
    InconsistentEol,

    /// A text base failed checksum verification. Fatal: callers must not
    /// fall back to full-text transmission, the mismatch needs investigating.
    #[error("checksum mismatch for text base '{path}': expected {expected}, actual {actual}")]
    CorruptTextBase {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// A versioned directory is obstructed by a non-directory on disk.
    #[error("the entry '{0}' is no longer a directory; remove the entry before updating")]
    ObstructedUpdate(PathBuf),

    /// Another process holds the directory's write lock.
    #[error("working copy '{0}' locked")]
    Locked(PathBuf),

    /// A write operation requires the directory's write lock.
    #[error("no write lock held for '{0}'")]
    NotLocked(PathBuf),

    /// The directory has no administrative area.
    #[error("'{0}' is not a working copy")]
    NotAWorkingCopy(PathBuf),

    /// A name was looked up in an entries file and not found.
    #[error("'{0}' is not under version control")]
    EntryNotFound(String),

    /// The administrative area was written by a newer client.
    #[error("working copy format {found} is too new (supported up to {supported})")]
    UnsupportedFormat { found: u8, supported: u8 },

    /// A durable file in the administrative area failed to decode.
    #[error("malformed administrative data: {0}")]
    Codec(&'static str),

    /// The caller-supplied cancellation probe fired. A clean abort, not a
    /// failure.
    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Context added while propagating an inner error.
    #[error("{context}")]
    Wrap {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Adds a layer of context, preserving `self` as the source.
    pub fn wrap(self, context: impl Into<String>) -> Error {
        Error::Wrap {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Composes a follow-up failure (e.g. a failed `abort_report`) onto the
    /// original error. The original stays first in the chain and keeps
    /// determining the error kind.
    pub fn also(self, later: Error) -> Error {
        Error::Wrap {
            context: format!("additionally: {later}"),
            source: Box::new(self),
        }
    }

    /// The innermost non-wrapping error, which determines the kind.
    pub fn root(&self) -> &Error {
        match self {
            Error::Wrap { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the operation ended through the cancellation probe.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled)
    }
}
