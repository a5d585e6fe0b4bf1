//! Defines the per-directory entry store --- [`EntriesFile`].
//!
//! Every versioned directory keeps one record per child plus a
//! distinguished self-entry under the empty name holding the directory's
//! own URL and revision.

mod codec;
mod store;

#[cfg(test)]
mod tests;

use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};

pub use store::EntriesFile;

/// Key of the self-entry in every entries map.
pub const THIS_DIR: &str = "";

/// A repository revision number.
pub type Revnum = u64;

/// In-memory form of one directory's entries.
pub type EntriesMap = std::collections::BTreeMap<String, Entry>;

/// Node kind recorded for an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, ToPrimitive)]
pub enum Kind {
    #[default]
    Unknown = 0,
    File = 1,
    Directory = 2,
}

/// Pending disposition of an entry at the next commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromPrimitive, ToPrimitive)]
pub enum Schedule {
    #[default]
    Normal = 0,
    Add = 1,
    Delete = 2,
    Replace = 3,
}

/// Seconds/nanoseconds timestamp of entry bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: u32,
}

bitflags! {
    /// Boolean attributes persisted with an entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EntryFlags: u8 {
        /// Deleted in the repository but still recorded here.
        const DELETED = 1;
        /// Known to exist but not present locally (authz or depth).
        const ABSENT = 2;
        /// Directory whose child list is known to be partial.
        const INCOMPLETE = 4;
        /// Entry was created by a copy.
        const COPIED = 8;
    }
}

bitflags! {
    /// Selects which [`EntryPatch`] fields a modify call applies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModifyFields: u32 {
        const KIND = 1 << 0;
        const SCHEDULE = 1 << 1;
        const REVISION = 1 << 2;
        const URL = 1 << 3;
        const COPIED_FROM = 1 << 4;
        const CHECKSUM = 1 << 5;
        const TEXT_TIME = 1 << 6;
        const PROP_TIME = 1 << 7;
        const COMMITTED_REV = 1 << 8;
        const COMMITTED_DATE = 1 << 9;
        const COMMITTED_AUTHOR = 1 << 10;
        const LOCK_TOKEN = 1 << 11;
        const CONFLICT_OLD = 1 << 12;
        const CONFLICT_NEW = 1 << 13;
        const CONFLICT_WORKING = 1 << 14;
        const PROP_REJECT = 1 << 15;
        const FLAGS = 1 << 16;
    }
}

/// One versioned object as recorded in its parent directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entry {
    pub name: String,
    pub kind: Kind,
    pub schedule: Schedule,
    /// Revision the text-base corresponds to; `None` is the invalid
    /// revision.
    pub revision: Option<Revnum>,
    /// Canonical, percent-encoded repository URL.
    pub url: Option<String>,
    /// Copy source, present exactly when [`EntryFlags::COPIED`] is set.
    pub copied_from: Option<(String, Revnum)>,
    /// MD5 digest of the committed text-base.
    pub checksum: Option<[u8; 16]>,
    /// Working file mtime last seen in step with the text-base.
    pub text_time: Option<Timestamp>,
    /// Working properties mtime last seen in step with the base.
    pub prop_time: Option<Timestamp>,
    pub committed_rev: Option<Revnum>,
    pub committed_date: Option<Timestamp>,
    pub committed_author: Option<String>,
    /// Repository lock token held for this entry, if any.
    pub lock_token: Option<String>,
    /// Text conflict artifacts left by a merge.
    pub conflict_old: Option<String>,
    pub conflict_new: Option<String>,
    pub conflict_working: Option<String>,
    /// Property conflict artifact.
    pub prop_reject: Option<String>,
    pub flags: EntryFlags,
}

impl Entry {
    pub fn new(name: impl Into<String>, kind: Kind) -> Entry {
        Entry {
            name: name.into(),
            kind,
            ..Entry::default()
        }
    }

    /// Hidden entries record state the repository no longer materialises.
    pub fn hidden(&self) -> bool {
        self.flags
            .intersects(EntryFlags::DELETED | EntryFlags::ABSENT)
    }

    pub fn deleted(&self) -> bool {
        self.flags.contains(EntryFlags::DELETED)
    }

    pub fn absent(&self) -> bool {
        self.flags.contains(EntryFlags::ABSENT)
    }

    pub fn incomplete(&self) -> bool {
        self.flags.contains(EntryFlags::INCOMPLETE)
    }
}

/// Replacement values for a modify call; [`ModifyFields`] selects which of
/// these actually apply, untouched fields keep their prior values.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub kind: Kind,
    pub schedule: Schedule,
    pub revision: Option<Revnum>,
    pub url: Option<String>,
    pub copied_from: Option<(String, Revnum)>,
    pub checksum: Option<[u8; 16]>,
    pub text_time: Option<Timestamp>,
    pub prop_time: Option<Timestamp>,
    pub committed_rev: Option<Revnum>,
    pub committed_date: Option<Timestamp>,
    pub committed_author: Option<String>,
    pub lock_token: Option<String>,
    pub conflict_old: Option<String>,
    pub conflict_new: Option<String>,
    pub conflict_working: Option<String>,
    pub prop_reject: Option<String>,
    pub flags: EntryFlags,
}

impl EntryPatch {
    /// Applies the selected fields onto `entry`.
    pub(crate) fn apply(&self, entry: &mut Entry, fields: ModifyFields) {
        if fields.contains(ModifyFields::KIND) {
            entry.kind = self.kind;
        }
        if fields.contains(ModifyFields::SCHEDULE) {
            entry.schedule = self.schedule;
        }
        if fields.contains(ModifyFields::REVISION) {
            entry.revision = self.revision;
        }
        if fields.contains(ModifyFields::URL) {
            entry.url = self.url.clone();
        }
        if fields.contains(ModifyFields::COPIED_FROM) {
            entry.copied_from = self.copied_from.clone();
        }
        if fields.contains(ModifyFields::CHECKSUM) {
            entry.checksum = self.checksum;
        }
        if fields.contains(ModifyFields::TEXT_TIME) {
            entry.text_time = self.text_time;
        }
        if fields.contains(ModifyFields::PROP_TIME) {
            entry.prop_time = self.prop_time;
        }
        if fields.contains(ModifyFields::COMMITTED_REV) {
            entry.committed_rev = self.committed_rev;
        }
        if fields.contains(ModifyFields::COMMITTED_DATE) {
            entry.committed_date = self.committed_date;
        }
        if fields.contains(ModifyFields::COMMITTED_AUTHOR) {
            entry.committed_author = self.committed_author.clone();
        }
        if fields.contains(ModifyFields::LOCK_TOKEN) {
            entry.lock_token = self.lock_token.clone();
        }
        if fields.contains(ModifyFields::CONFLICT_OLD) {
            entry.conflict_old = self.conflict_old.clone();
        }
        if fields.contains(ModifyFields::CONFLICT_NEW) {
            entry.conflict_new = self.conflict_new.clone();
        }
        if fields.contains(ModifyFields::CONFLICT_WORKING) {
            entry.conflict_working = self.conflict_working.clone();
        }
        if fields.contains(ModifyFields::PROP_REJECT) {
            entry.prop_reject = self.prop_reject.clone();
        }
        if fields.contains(ModifyFields::FLAGS) {
            entry.flags = self.flags;
        }
    }
}
