#![cfg(test)]

use super::two_way_diff;
use crate::merge::diff;

#[test]
fn test_degenerate_inputs() {
    two_way_diff("foo1", "bar1", "", "", "");

    two_way_diff(
        "foo2",
        "bar2",
        "Aa\nBb\nCc\n",
        "",
        "--- foo2\n+++ bar2\n@@ -1,3 +0,0 @@\n-Aa\n-Bb\n-Cc\n",
    );

    two_way_diff(
        "foo3",
        "bar3",
        "",
        "Aa\nBb\nCc\n",
        "--- foo3\n+++ bar3\n@@ -0,0 +1,3 @@\n+Aa\n+Bb\n+Cc\n",
    );
}

#[test]
fn test_unified_appends_and_deletes() {
    two_way_diff(
        "foo4",
        "bar4",
        "Aa\n",
        "Aa\nBb\nCc\n",
        "--- foo4\n+++ bar4\n@@ -1 +1,3 @@\n Aa\n+Bb\n+Cc\n",
    );

    two_way_diff(
        "foo4b",
        "bar4b",
        "Cc\n",
        "Aa\nBb\nCc\n",
        "--- foo4b\n+++ bar4b\n@@ -1 +1,3 @@\n+Aa\n+Bb\n Cc\n",
    );

    two_way_diff(
        "foo5",
        "bar5",
        "Aa\nBb\nCc\n",
        "Aa\n",
        "--- foo5\n+++ bar5\n@@ -1,3 +1 @@\n Aa\n-Bb\n-Cc\n",
    );

    two_way_diff(
        "foo5b",
        "bar5b",
        "Aa\nBb\nCc\n",
        "Cc\n",
        "--- foo5b\n+++ bar5b\n@@ -1,3 +1 @@\n-Aa\n-Bb\n Cc\n",
    );

    two_way_diff("foo6", "bar6", "Aa\nBb\nCc\n", "Aa\nBb\nCc\n", "");
}

#[test]
fn test_unified_replacements() {
    two_way_diff(
        "foo6b",
        "bar6b",
        "Aa\nBb\nCc\n",
        "Aa\nXx\nCc\n",
        "--- foo6b\n+++ bar6b\n@@ -1,3 +1,3 @@\n Aa\n-Bb\n+Xx\n Cc\n",
    );

    two_way_diff(
        "foo6c",
        "bar6c",
        "Aa\r\nBb\r\nCc\r\n",
        "Aa\r\nXx\r\nCc\r\n",
        "--- foo6c\n+++ bar6c\n@@ -1,3 +1,3 @@\n Aa\r\n-Bb\r\n+Xx\r\n Cc\r\n",
    );

    two_way_diff(
        "foo7",
        "bar7",
        "Aa\n",
        "Bb\n",
        "--- foo7\n+++ bar7\n@@ -1 +1 @@\n-Aa\n+Bb\n",
    );

    two_way_diff(
        "foo7a",
        "bar7a",
        "Aa\nCc\n",
        "Bb\nCc\n",
        "--- foo7a\n+++ bar7a\n@@ -1,2 +1,2 @@\n-Aa\n+Bb\n Cc\n",
    );

    two_way_diff(
        "foo8",
        "bar8",
        "Aa\nBb\nCc\n",
        "Xx\nYy\n",
        "--- foo8\n+++ bar8\n@@ -1,3 +1,2 @@\n-Aa\n-Bb\n-Cc\n+Xx\n+Yy\n",
    );

    two_way_diff(
        "foo9",
        "bar9",
        "Aa\nBb\nCc\n",
        "Bb\n",
        "--- foo9\n+++ bar9\n@@ -1,3 +1 @@\n-Aa\n Bb\n-Cc\n",
    );
}

#[test]
fn test_unified_no_newline_markers() {
    two_way_diff(
        "foo10",
        "bar10",
        "Aa\nBb\nCc",
        "Aa\nXx\nYy\n",
        "--- foo10\n+++ bar10\n@@ -1,3 +1,3 @@\n Aa\n-Bb\n-Cc\n\\ No newline at end of file\n+Xx\n+Yy\n",
    );

    two_way_diff(
        "foo11",
        "bar11",
        "Aa\nXx\nYy\n",
        "Aa\nBb\nCc",
        "--- foo11\n+++ bar11\n@@ -1,3 +1,3 @@\n Aa\n-Xx\n-Yy\n+Bb\n+Cc\n\\ No newline at end of file\n",
    );

    two_way_diff(
        "foo12",
        "bar12",
        "Aa\nXx\nYy",
        "Aa\nBb\nCc",
        "--- foo12\n+++ bar12\n@@ -1,3 +1,3 @@\n Aa\n-Xx\n-Yy\n\\ No newline at end of file\n+Bb\n+Cc\n\\ No newline at end of file\n",
    );
}

#[test]
fn test_unified_hunk_grouping() {
    // Far-apart changes get separate hunks.
    two_way_diff(
        "foo13",
        "bar13",
        "Aa\nBb\nCc\nDd\nEe\nFf\nGg\n",
        "Xx\nAa\nBb\nCc\nDd\nEe\nFf\nGg\nYy\n",
        "--- foo13\n+++ bar13\n@@ -1,3 +1,4 @@\n+Xx\n Aa\n Bb\n Cc\n@@ -5,3 +6,4 @@\n Ee\n Ff\n Gg\n+Yy\n",
    );

    // Near changes share one hunk.
    two_way_diff(
        "foo14",
        "bar14",
        "Aa\nBb\nCc\nDd\nEe\nFf\nGg\n",
        "Bb\nAa\nCc\nDd\nEe\nGg\nFf\n",
        "--- foo14\n+++ bar14\n@@ -1,7 +1,7 @@\n+Bb\n Aa\n-Bb\n Cc\n Dd\n Ee\n+Gg\n Ff\n-Gg\n",
    );

    two_way_diff(
        "foo16",
        "bar16",
        "Aa\n\nCc\n",
        "Aa\nBb\nCc\n",
        "--- foo16\n+++ bar16\n@@ -1,3 +1,3 @@\n Aa\n-\n+Bb\n Cc\n",
    );
}

#[test]
fn test_unified_context_windows() {
    two_way_diff(
        "foo15a",
        "bar15a",
        "Aa\nBb\nCc\nDd\nEe\nFf\nGg\nHh\nIi\n",
        "Aa\nBb\nCc\nDd\nFf\nGg\nHh\nIi\n",
        "--- foo15a\n+++ bar15a\n@@ -2,7 +2,6 @@\n Bb\n Cc\n Dd\n-Ee\n Ff\n Gg\n Hh\n",
    );

    two_way_diff(
        "foo15b",
        "bar15b",
        "Aa\nBb\nCc\nDd\nEe\nFf\nGg\nHh\nIi\n",
        "Aa\nBb\nCc\nDd\nEe\nXx\nYy\nFf\nGg\nHh\nIi\n",
        "--- foo15b\n+++ bar15b\n@@ -3,6 +3,8 @@\n Cc\n Dd\n Ee\n+Xx\n+Yy\n Ff\n Gg\n Hh\n",
    );

    two_way_diff(
        "foo15c",
        "bar15c",
        "Aa\nBb\nCc\nDd\nEe\nFf\nGg\nHh\nIi\n",
        "Aa\nBb\nCc\nDd\nXx\nYy\nFf\nGg\nHh\nIi\n",
        "--- foo15c\n+++ bar15c\n@@ -2,7 +2,8 @@\n Bb\n Cc\n Dd\n-Ee\n+Xx\n+Yy\n Ff\n Gg\n Hh\n",
    );
}

#[test]
fn test_no_labels_skips_file_header() {
    let d = diff(b"Aa\nBb\nCc", b"Aa\nBb\nCc\n");
    let mut out = Vec::new();
    d.write_unified(&mut out, None, None).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "@@ -1,3 +1,3 @@\n Aa\n Bb\n-Cc\n\\ No newline at end of file\n+Cc\n",
    );
}
