//! Renders diffs as unified output and merges as marked-up text.

use std::io::{self, Write};

use super::diff3::{Hunk, HunkKind};
use super::lcs::Change;
use super::line::has_eol;
use super::MergeLabels;

/// Context lines shown around each unified hunk.
const CONTEXT: usize = 3;

const NO_NEWLINE: &[u8] = b"\\ No newline at end of file\n";

/// Writes one source line under a unified-diff prefix, flagging a missing
/// terminator the way diff does.
fn put_line(out: &mut dyn Write, prefix: u8, line: &[u8]) -> io::Result<()> {
    out.write_all(&[prefix])?;
    out.write_all(line)?;
    if !has_eol(line) {
        out.write_all(b"\n")?;
        out.write_all(NO_NEWLINE)?;
    }
    Ok(())
}

/// Writes the whole diff in unified format. Nothing is written for an
/// empty change list; the `---`/`+++` header appears only when labels are
/// supplied.
pub(super) fn write_unified(
    out: &mut dyn Write,
    original_tokens: &[&[u8]],
    modified_tokens: &[&[u8]],
    changes: &[Change],
    original_label: Option<&str>,
    modified_label: Option<&str>,
) -> io::Result<()> {
    if changes.is_empty() {
        return Ok(());
    }
    if let (Some(original_label), Some(modified_label)) = (original_label, modified_label) {
        writeln!(out, "--- {original_label}")?;
        writeln!(out, "+++ {modified_label}")?;
    }

    let mut group_start = 0;
    for i in 0..changes.len() {
        let last_in_group = match changes.get(i + 1) {
            Some(next) => next.original.start > changes[i].original.end + 2 * CONTEXT,
            None => true,
        };
        if last_in_group {
            write_group(out, original_tokens, modified_tokens, &changes[group_start..=i])?;
            group_start = i + 1;
        }
    }
    Ok(())
}

/// Writes one run of changes close enough to share their context.
fn write_group(
    out: &mut dyn Write,
    original_tokens: &[&[u8]],
    modified_tokens: &[&[u8]],
    group: &[Change],
) -> io::Result<()> {
    let first = group.first().expect("group is never empty");
    let last = group.last().expect("group is never empty");

    let orig_start = first.original.start.saturating_sub(CONTEXT);
    let orig_end = (last.original.end + CONTEXT).min(original_tokens.len());
    let mod_start = first.other.start - (first.original.start - orig_start);
    let mod_end = last.other.end + (orig_end - last.original.end);

    writeln!(
        out,
        "@@ -{} +{} @@",
        coord(orig_start, orig_end - orig_start),
        coord(mod_start, mod_end - mod_start)
    )?;

    let mut pos = orig_start;
    for change in group {
        for line in &original_tokens[pos..change.original.start] {
            put_line(out, b' ', line)?;
        }
        for line in &original_tokens[change.original.clone()] {
            put_line(out, b'-', line)?;
        }
        for line in &modified_tokens[change.other.clone()] {
            put_line(out, b'+', line)?;
        }
        pos = change.original.end;
    }
    for line in &original_tokens[pos..orig_end] {
        put_line(out, b' ', line)?;
    }
    Ok(())
}

/// Renders one side of a `@@` header: 1-based start with the length,
/// shortened to the bare line number for length one, and the 0-based
/// insertion point for length zero.
fn coord(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

/// Writes the merged text, marking conflicts.
///
/// Marker lines terminate with LF; hunk text is reproduced byte-for-byte,
/// so a hunk lacking a final terminator runs straight into the following
/// marker.
pub(super) fn write_merged(
    out: &mut dyn Write,
    hunks: &[Hunk],
    original_tokens: &[&[u8]],
    modified_tokens: &[&[u8]],
    latest_tokens: &[&[u8]],
    labels: &MergeLabels,
    display_original: bool,
) -> io::Result<()> {
    for hunk in hunks {
        match hunk.kind {
            HunkKind::Unchanged | HunkKind::Modified | HunkKind::Identical => {
                for line in &modified_tokens[hunk.modified.clone()] {
                    out.write_all(line)?;
                }
            }
            HunkKind::Latest => {
                for line in &latest_tokens[hunk.latest.clone()] {
                    out.write_all(line)?;
                }
            }
            HunkKind::Conflict => {
                writeln!(out, "<<<<<<< {}", labels.mine)?;
                for line in &modified_tokens[hunk.modified.clone()] {
                    out.write_all(line)?;
                }
                if display_original {
                    writeln!(out, "||||||| {}", labels.original)?;
                    for line in &original_tokens[hunk.original.clone()] {
                        out.write_all(line)?;
                    }
                }
                out.write_all(b"=======\n")?;
                for line in &latest_tokens[hunk.latest.clone()] {
                    out.write_all(line)?;
                }
                writeln!(out, ">>>>>>> {}", labels.theirs)?;
            }
        }
    }
    Ok(())
}
