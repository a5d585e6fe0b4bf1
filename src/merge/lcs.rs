//! Longest-common-subsequence computation over line tokens.
//!
//! Myers' O(ND) greedy algorithm. On equal reach the deletion diagonal
//! wins, which pins down which of several equally short edit scripts comes
//! out; the rest of the engine and its expected outputs depend on that
//! choice, so it is part of the contract here, not a tuning knob.

use std::ops::Range;

/// One maximal changed region between two common runs: `original` in the
/// old sequence is replaced by `other` in the new one. Either range (not
/// both) may be empty, making it a pure delete or insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub original: Range<usize>,
    pub other: Range<usize>,
}

/// Computes the changed regions turning `a` into `b`.
pub(super) fn diff_ranges(a: &[&[u8]], b: &[&[u8]]) -> Vec<Change> {
    let matches = lcs_matches(a, b);
    let mut changes = Vec::new();
    let (mut x, mut y) = (0usize, 0usize);
    for &(mx, my) in &matches {
        if mx > x || my > y {
            changes.push(Change {
                original: x..mx,
                other: y..my,
            });
        }
        x = mx + 1;
        y = my + 1;
    }
    if a.len() > x || b.len() > y {
        changes.push(Change {
            original: x..a.len(),
            other: y..b.len(),
        });
    }
    changes
}

/// The matched index pairs of the LCS, ascending.
fn lcs_matches(a: &[&[u8]], b: &[&[u8]]) -> Vec<(usize, usize)> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let max = n + m;
    let offset = max;
    // v[k + offset] = furthest x on diagonal k.
    let mut v = vec![0isize; (2 * max + 1) as usize];
    let mut trace: Vec<Vec<isize>> = Vec::new();

    'outer: for d in 0..=max {
        trace.push(v.clone());
        let mut k = -d;
        while k <= d {
            let down = k == -d || (k != d && v[(k - 1 + offset) as usize] + 1 < v[(k + 1 + offset) as usize]);
            let mut x = if down {
                v[(k + 1 + offset) as usize]
            } else {
                v[(k - 1 + offset) as usize] + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            v[(k + offset) as usize] = x;
            if x >= n && y >= m {
                break 'outer;
            }
            k += 2;
        }
    }

    // Backtrack through the saved states, collecting snake diagonals.
    let mut matches = Vec::new();
    let (mut x, mut y) = (n, m);
    for d in (0..trace.len() as isize).rev() {
        if x == 0 && y == 0 {
            break;
        }
        let v = &trace[d as usize];
        let k = x - y;
        let down = k == -d || (k != d && v[(k - 1 + offset) as usize] + 1 < v[(k + 1 + offset) as usize]);
        let prev_k = if down { k + 1 } else { k - 1 };
        let prev_x = v[(prev_k + offset) as usize];
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            matches.push(((x - 1) as usize, (y - 1) as usize));
            x -= 1;
            y -= 1;
        }
        if d > 0 {
            x = prev_x;
            y = prev_y;
        }
    }
    matches.reverse();
    matches
}
