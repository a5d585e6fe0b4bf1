#![cfg(test)]

mod tokens;
mod two_way;

use super::{diff, diff3, MergeLabels};

/// Renders the unified diff of `c1` against `c2` under the given labels
/// and checks it, then checks the two trivial merges built from the same
/// pair the way the general algorithm produces them.
pub(super) fn two_way_diff(
    label1: &str,
    label2: &str,
    c1: &str,
    c2: &str,
    expected: &str,
) {
    let d = diff(c1.as_bytes(), c2.as_bytes());
    let mut out = Vec::new();
    d.write_unified(&mut out, Some(label1), Some(label2))
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        expected,
        "unified {label1} vs {label2}"
    );

    // Updating c1 to c2 and downdating c2 to c1 both merge trivially.
    three_way_merge(label1, label2, label1, c1, c2, c1, c2);
    three_way_merge(label2, label1, label2, c2, c1, c2, c1);
}

/// Runs the full three-way algorithm (no shortcuts) on the given contents
/// and checks the merged output.
pub(super) fn three_way_merge(
    label1: &str,
    label2: &str,
    label3: &str,
    ancestor: &str,
    theirs: &str,
    mine: &str,
    expected: &str,
) {
    let d = diff3(ancestor.as_bytes(), theirs.as_bytes(), mine.as_bytes());
    let labels = MergeLabels {
        mine: label2.to_string(),
        original: label1.to_string(),
        theirs: label3.to_string(),
    };
    let mut out = Vec::new();
    d.write_merged(&mut out, &labels, false).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        expected,
        "merge {label1}/{label2}/{label3}"
    );
}
