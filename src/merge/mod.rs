//! Line-based diff and three-way merge.
//!
//! [`diff`] compares two byte streams and renders unified output;
//! [`diff3`] folds two streams of edits against a shared ancestor into
//! hunks, and [`merge`] renders them with conflict markers. Inputs are
//! compared line by line, terminators included: LF, CRLF and CR all bound
//! lines and survive byte-for-byte into the output.

mod diff3;
mod lcs;
mod line;
mod output;

#[cfg(test)]
mod tests;

use std::io::{self, Write};

use crate::cancel::{self, Cancel};
use crate::Result;

pub use diff3::{Hunk, HunkKind};
pub use lcs::Change;

/// A two-way comparison of two byte streams.
#[derive(Debug)]
pub struct Diff<'a> {
    original: Vec<&'a [u8]>,
    modified: Vec<&'a [u8]>,
    changes: Vec<Change>,
}

/// Compares two byte streams line by line.
pub fn diff<'a>(original: &'a [u8], modified: &'a [u8]) -> Diff<'a> {
    let original = line::split_lines(original);
    let modified = line::split_lines(modified);
    let changes = lcs::diff_ranges(&original, &modified);
    Diff {
        original,
        modified,
        changes,
    }
}

impl<'a> Diff<'a> {
    /// True when the streams differ.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// The changed regions, in stream order.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Writes the comparison in unified format with three lines of
    /// context. Identical streams produce no output at all; the
    /// `---`/`+++` header appears only when both labels are given.
    pub fn write_unified(
        &self,
        out: &mut dyn Write,
        original_label: Option<&str>,
        modified_label: Option<&str>,
    ) -> io::Result<()> {
        output::write_unified(
            out,
            &self.original,
            &self.modified,
            &self.changes,
            original_label,
            modified_label,
        )
    }
}

/// A three-way comparison against a shared ancestor.
#[derive(Debug)]
pub struct Diff3<'a> {
    original: Vec<&'a [u8]>,
    modified: Vec<&'a [u8]>,
    latest: Vec<&'a [u8]>,
    hunks: Vec<Hunk>,
}

/// Compares two descendants of `original` line by line.
pub fn diff3<'a>(original: &'a [u8], modified: &'a [u8], latest: &'a [u8]) -> Diff3<'a> {
    let original = line::split_lines(original);
    let modified = line::split_lines(modified);
    let latest = line::split_lines(latest);
    let changes_om = lcs::diff_ranges(&original, &modified);
    let changes_ol = lcs::diff_ranges(&original, &latest);
    let hunks = diff3::sweep(&changes_om, &changes_ol, &original, &modified, &latest);
    Diff3 {
        original,
        modified,
        latest,
        hunks,
    }
}

/// [`diff3`] with a cancellation probe, polled between the major phases.
pub fn diff3_with_cancel<'a>(
    original: &'a [u8],
    modified: &'a [u8],
    latest: &'a [u8],
    probe: &dyn Cancel,
) -> Result<Diff3<'a>> {
    let original = line::split_lines(original);
    let modified = line::split_lines(modified);
    let latest = line::split_lines(latest);
    cancel::check(probe)?;
    let changes_om = lcs::diff_ranges(&original, &modified);
    cancel::check(probe)?;
    let changes_ol = lcs::diff_ranges(&original, &latest);
    cancel::check(probe)?;
    let hunks = diff3::sweep(&changes_om, &changes_ol, &original, &modified, &latest);
    Ok(Diff3 {
        original,
        modified,
        latest,
        hunks,
    })
}

impl<'a> Diff3<'a> {
    /// True when any hunk needs conflict markers.
    pub fn has_conflicts(&self) -> bool {
        self.hunks.iter().any(|h| h.kind == HunkKind::Conflict)
    }

    /// The merge hunks, in ancestor order.
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// Writes the merged text. Conflicts are bracketed with
    /// `<<<<<<<`/`=======`/`>>>>>>>` markers carrying the labels; with
    /// `display_original` the ancestor text appears under a `|||||||`
    /// marker inside each conflict.
    pub fn write_merged(
        &self,
        out: &mut dyn Write,
        labels: &MergeLabels,
        display_original: bool,
    ) -> io::Result<()> {
        output::write_merged(
            out,
            &self.hunks,
            &self.original,
            &self.modified,
            &self.latest,
            labels,
            display_original,
        )
    }
}

/// Labels on conflict markers. `mine` opens a conflict (`<<<<<<<`),
/// `theirs` closes it (`>>>>>>>`), `original` names the ancestor block
/// when it is displayed.
#[derive(Debug, Clone)]
pub struct MergeLabels {
    pub mine: String,
    pub original: String,
    pub theirs: String,
}

impl Default for MergeLabels {
    fn default() -> MergeLabels {
        MergeLabels {
            mine: "mine".to_string(),
            original: "original".to_string(),
            theirs: "theirs".to_string(),
        }
    }
}

/// Outcome of [`merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    pub output: Vec<u8>,
    pub conflicted: bool,
}

/// Merges two streams of edits to `ancestor` into one output stream.
///
/// `theirs` fills the block a conflict opens with, `mine` the block after
/// the separator. Identical inputs short-circuit: the general algorithm
/// is only consulted when all three differ, and produces the same bytes
/// where the shortcuts apply.
pub fn merge(
    ancestor: &[u8],
    theirs: &[u8],
    mine: &[u8],
    labels: &MergeLabels,
    probe: &dyn Cancel,
) -> Result<MergeResult> {
    if ancestor == theirs || theirs == mine {
        return Ok(MergeResult {
            output: mine.to_vec(),
            conflicted: false,
        });
    }
    if ancestor == mine {
        return Ok(MergeResult {
            output: theirs.to_vec(),
            conflicted: false,
        });
    }
    let diff = diff3_with_cancel(ancestor, theirs, mine, probe)?;
    cancel::check(probe)?;
    let mut output = Vec::new();
    diff.write_merged(&mut output, labels, false)?;
    Ok(MergeResult {
        output,
        conflicted: diff.has_conflicts(),
    })
}
