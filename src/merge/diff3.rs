//! Folds two diffs against a common ancestor into merge hunks.
//!
//! Both sides' changes are expressed as common-run chains against the
//! ancestor. The sweep walks the chains looking for sync points: ancestor
//! positions still covered by a common run on each side. The stretch
//! between two sync points becomes one hunk, classified by which sides
//! changed in it. Two adjacent changes from different sides stay separate
//! hunks as long as each side's chain covers the other's change; tests
//! lock this resolution policy in, together with the tail-append fold
//! below.

use std::ops::Range;

use super::lcs::Change;

/// Classification of one merge hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkKind {
    /// All three sides agree over the span.
    Unchanged,
    /// Only the modified side changed; its text survives.
    Modified,
    /// Only the latest side changed; its text survives.
    Latest,
    /// Both sides changed identically; either text survives.
    Identical,
    /// Both sides changed differently; needs conflict markers.
    Conflict,
}

/// One span of merge output, as token ranges into the three inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub kind: HunkKind,
    pub original: Range<usize>,
    pub modified: Range<usize>,
    pub latest: Range<usize>,
}

/// A common run between the ancestor and one side.
#[derive(Debug, Clone, Copy)]
struct Run {
    orig: usize,
    side: usize,
    len: usize,
}

impl Run {
    fn orig_end(&self) -> usize {
        self.orig + self.len
    }

    fn side_end(&self) -> usize {
        self.side + self.len
    }
}

/// Complement of a change list: the common runs, closed by a zero-length
/// sentinel pinned at both EOFs.
fn common_runs(changes: &[Change], orig_len: usize, side_len: usize) -> Vec<Run> {
    let mut runs = Vec::new();
    let (mut o, mut s) = (0usize, 0usize);
    for change in changes {
        if change.original.start > o {
            runs.push(Run {
                orig: o,
                side: s,
                len: change.original.start - o,
            });
        }
        o = change.original.end;
        s = change.other.end;
    }
    if orig_len > o {
        runs.push(Run {
            orig: o,
            side: s,
            len: orig_len - o,
        });
    }
    runs.push(Run {
        orig: orig_len,
        side: side_len,
        len: 0,
    });
    runs
}

/// Folds the two change lists into an ordered hunk sequence.
pub(super) fn sweep(
    changes_om: &[Change],
    changes_ol: &[Change],
    original_tokens: &[&[u8]],
    modified_tokens: &[&[u8]],
    latest_tokens: &[&[u8]],
) -> Vec<Hunk> {
    let orig_len = original_tokens.len();
    let modified_len = modified_tokens.len();
    let latest_len = latest_tokens.len();
    let runs_om = common_runs(changes_om, orig_len, modified_len);
    let runs_ol = common_runs(changes_ol, orig_len, latest_len);

    let mut om = 0usize;
    let mut ol = 0usize;
    let mut original_start = 0usize;
    let mut modified_start = 0usize;
    let mut latest_start = 0usize;
    let mut hunks = Vec::new();

    loop {
        // Find the next sync point: the later of the two chains' current
        // positions, with the other chain advanced up to it.
        let sync = loop {
            let rom = runs_om[om];
            let rol = runs_ol[ol];
            if rom.orig > rol.orig {
                let sync = rom.orig;
                while runs_ol[ol].orig_end() < sync {
                    ol += 1;
                }
                // Tail-append fold: a pure append on the modified side
                // meets a latest-side chain whose last real run ends at
                // EOF. The run's tail belongs to the disputed region, so
                // skip it; without the fold a delete-at-EOF and an
                // append would merge silently past each other.
                if rom.len == 0 && rom.orig == orig_len {
                    let r = runs_ol[ol];
                    if r.len > 0 && r.orig_end() == sync && r.side_end() < latest_len {
                        ol += 1;
                    }
                }
                if runs_ol[ol].orig <= sync {
                    break sync;
                }
            } else {
                let sync = rol.orig;
                while runs_om[om].orig_end() < sync {
                    om += 1;
                }
                if rol.len == 0 && rol.orig == orig_len {
                    let r = runs_om[om];
                    if r.len > 0 && r.orig_end() == sync && r.side_end() < modified_len {
                        om += 1;
                    }
                }
                if runs_om[om].orig <= sync {
                    break sync;
                }
            }
        };

        let rom = runs_om[om];
        let rol = runs_ol[ol];

        // Classify the region between the previous sync point and this
        // one. A side counts as changed when its chain does not cover the
        // region, or when it has pending side-only content (an insert).
        let is_modified = rom.orig > original_start || rom.side > modified_start;
        let is_latest = rol.orig > original_start || rol.side > latest_start;

        let modified_end = if is_modified {
            rom.side
        } else {
            rom.side + (sync - rom.orig)
        };
        let latest_end = if is_latest {
            rol.side
        } else {
            rol.side + (sync - rol.orig)
        };

        if is_modified && is_latest {
            resolve_conflict(
                original_start..sync,
                modified_start..modified_end,
                latest_start..latest_end,
                modified_tokens,
                latest_tokens,
                &mut hunks,
            );
        } else if is_modified {
            hunks.push(Hunk {
                kind: HunkKind::Modified,
                original: original_start..sync,
                modified: modified_start..modified_end,
                latest: latest_start..latest_end,
            });
        } else if is_latest {
            hunks.push(Hunk {
                kind: HunkKind::Latest,
                original: original_start..sync,
                modified: modified_start..modified_end,
                latest: latest_start..latest_end,
            });
        }

        // The common stretch both chains cover from the sync point on.
        let common_end = rom.orig_end().min(rol.orig_end());
        let common_len = common_end.saturating_sub(sync);
        if common_len > 0 {
            let modified_common = rom.side + (sync - rom.orig);
            let latest_common = rol.side + (sync - rol.orig);
            hunks.push(Hunk {
                kind: HunkKind::Unchanged,
                original: sync..sync + common_len,
                modified: modified_common..modified_common + common_len,
                latest: latest_common..latest_common + common_len,
            });
        }

        original_start = sync + common_len;
        modified_start = rom.side + (sync - rom.orig) + common_len;
        latest_start = rol.side + (sync - rol.orig) + common_len;

        if runs_om[om].len > 0 && runs_om[om].orig_end() <= original_start {
            om += 1;
        }
        if runs_ol[ol].len > 0 && runs_ol[ol].orig_end() <= original_start {
            ol += 1;
        }
        if runs_om[om].len == 0
            && runs_ol[ol].len == 0
            && original_start >= orig_len
            && modified_start >= modified_len
            && latest_start >= latest_len
        {
            break;
        }
    }

    hunks
}

/// Splits a both-sides-changed region into identical and conflicting
/// parts by comparing the two replacements. Equal replacements merge
/// cleanly; otherwise the common head and tail split off and the middle
/// stays a conflict.
fn resolve_conflict(
    original: Range<usize>,
    modified: Range<usize>,
    latest: Range<usize>,
    modified_tokens: &[&[u8]],
    latest_tokens: &[&[u8]],
    hunks: &mut Vec<Hunk>,
) {
    let mods = &modified_tokens[modified.clone()];
    let lats = &latest_tokens[latest.clone()];

    if mods == lats {
        hunks.push(Hunk {
            kind: HunkKind::Identical,
            original,
            modified,
            latest,
        });
        return;
    }

    let mut prefix = 0;
    while prefix < mods.len().min(lats.len()) && mods[prefix] == lats[prefix] {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < (mods.len() - prefix).min(lats.len() - prefix)
        && mods[mods.len() - 1 - suffix] == lats[lats.len() - 1 - suffix]
    {
        suffix += 1;
    }

    if prefix > 0 {
        hunks.push(Hunk {
            kind: HunkKind::Identical,
            original: original.start..original.start,
            modified: modified.start..modified.start + prefix,
            latest: latest.start..latest.start + prefix,
        });
    }
    hunks.push(Hunk {
        kind: HunkKind::Conflict,
        original: original.clone(),
        modified: modified.start + prefix..modified.end - suffix,
        latest: latest.start + prefix..latest.end - suffix,
    });
    if suffix > 0 {
        hunks.push(Hunk {
            kind: HunkKind::Identical,
            original: original.end..original.end,
            modified: modified.end - suffix..modified.end,
            latest: latest.end - suffix..latest.end,
        });
    }
}
