//! In-place rewriting of a single keyword occurrence.
//!
//! A candidate arrives as `$...$` in a fixed buffer. Three forms are
//! recognised for every enabled keyword name:
//!
//! - unexpanded:   `$kw$` or `$kw:$`
//! - expanded:     `$kw: value $`
//! - fixed-width:  `$kw:: value $` (total width preserved, `#` marks
//!   truncation as the next-to-last byte)

use super::{Keywords, KEYWORD_MAX_LEN};

const REVISION_NAMES: [&str; 3] = ["LastChangedRevision", "Revision", "Rev"];
const DATE_NAMES: [&str; 2] = ["LastChangedDate", "Date"];
const AUTHOR_NAMES: [&str; 2] = ["LastChangedBy", "Author"];
const URL_NAMES: [&str; 2] = ["HeadURL", "URL"];
const ID_NAMES: [&str; 1] = ["Id"];

/// Rewrites the candidate in `buf[..*len]` if it is an occurrence of an
/// enabled keyword, updating `*len` to the rewritten length. Returns false
/// (buffer untouched) when no enabled keyword matches.
///
/// With `expand` set, values are substituted in; otherwise occurrences are
/// contracted back to `$kw$`.
pub(super) fn translate(
    buf: &mut [u8; KEYWORD_MAX_LEN],
    len: &mut usize,
    expand: bool,
    keywords: &Keywords,
) -> bool {
    let groups: [(&[&str], &Option<String>); 5] = [
        (&REVISION_NAMES, &keywords.revision),
        (&DATE_NAMES, &keywords.date),
        (&AUTHOR_NAMES, &keywords.author),
        (&URL_NAMES, &keywords.url),
        (&ID_NAMES, &keywords.id),
    ];
    for (names, value) in groups {
        let Some(value) = value else { continue };
        for name in names {
            let value = if expand { Some(value.as_str()) } else { None };
            if subst(buf, len, name.as_bytes(), value) {
                return true;
            }
        }
    }
    false
}

/// Substitutes `value` into the candidate for one concrete keyword name.
/// A `None` value contracts, a present one expands. Returns false when the
/// candidate is not an occurrence of this name.
fn subst(
    buf: &mut [u8; KEYWORD_MAX_LEN],
    len: &mut usize,
    name: &[u8],
    value: Option<&str>,
) -> bool {
    debug_assert!(*len <= KEYWORD_MAX_LEN);
    debug_assert!(buf[0] == b'$' && buf[*len - 1] == b'$');

    // Need at least the name and two dollar signs.
    if *len < name.len() + 2 || &buf[1..1 + name.len()] != name {
        return false;
    }
    let rest = 1 + name.len();

    // Fixed-width form: "$kw:: value $". The total width never changes.
    if *len > rest + 2
        && buf[rest] == b':'
        && buf[rest + 1] == b':'
        && buf[rest + 2] == b' '
        && (buf[*len - 2] == b' ' || buf[*len - 2] == b'#')
        && name.len() + 6 < *len
    {
        let field = rest + 3..*len - 1;
        match value {
            None => {
                buf[field].fill(b' ');
            }
            Some(value) => {
                let capacity = *len - (name.len() + 6);
                if value.len() <= capacity {
                    buf[field.start..field.start + value.len()]
                        .copy_from_slice(value.as_bytes());
                    buf[field.start + value.len()..field.end].fill(b' ');
                } else {
                    buf[field.start..field.start + capacity]
                        .copy_from_slice(&value.as_bytes()[..capacity]);
                    buf[*len - 2] = b'#';
                }
            }
        }
        return true;
    }

    // Unexpanded form: "$kw$" or "$kw:$".
    if buf[rest] == b'$' || (buf[rest] == b':' && buf[rest + 1] == b'$') {
        if let Some(value) = value {
            write_expansion(buf, len, rest, value);
        }
        return true;
    }

    // Expanded form: "$kw: value $".
    if *len >= name.len() + 4
        && buf[rest] == b':'
        && buf[rest + 1] == b' '
        && buf[*len - 2] == b' '
    {
        match value {
            None => {
                buf[rest] = b'$';
                *len = rest + 1;
            }
            Some(value) => {
                write_expansion(buf, len, rest, value);
            }
        }
        return true;
    }

    false
}

/// Rewrites the candidate as "$kw: value $" (or "$kw: $" for an empty
/// value), truncating the value so the result stays within the buffer.
fn write_expansion(buf: &mut [u8; KEYWORD_MAX_LEN], len: &mut usize, rest: usize, value: &str) {
    buf[rest] = b':';
    buf[rest + 1] = b' ';
    if value.is_empty() {
        buf[rest + 2] = b'$';
        *len = rest + 3;
        return;
    }
    let vallen = value.len().min(KEYWORD_MAX_LEN - rest - 4);
    buf[rest + 2..rest + 2 + vallen].copy_from_slice(&value.as_bytes()[..vallen]);
    buf[rest + 2 + vallen] = b' ';
    buf[rest + 3 + vallen] = b'$';
    *len = rest + 4 + vallen;
}
