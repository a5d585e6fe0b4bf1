#![cfg(test)]

use crate::merge::diff;

fn split(data: &[u8]) -> Vec<&[u8]> {
    crate::merge::line::split_lines(data)
}

#[test]
fn test_split_lf() {
    assert_eq!(split(b"a\nb\nc\n"), vec![&b"a\n"[..], b"b\n", b"c\n"]);
}

#[test]
fn test_split_final_line_unterminated() {
    assert_eq!(split(b"a\nb"), vec![&b"a\n"[..], b"b"]);
    assert_eq!(split(b"b"), vec![&b"b"[..]]);
    assert!(split(b"").is_empty());
}

#[test]
fn test_split_crlf_and_cr() {
    assert_eq!(split(b"a\r\nb\rc\n"), vec![&b"a\r\n"[..], b"b\r", b"c\n"]);
    // "\n\r" is two terminators, not a pair.
    assert_eq!(split(b"a\n\rb"), vec![&b"a\n"[..], b"\r", b"b"]);
    assert_eq!(split(b"\r\n"), vec![&b"\r\n"[..]]);
}

#[test]
fn test_terminators_distinguish_tokens() {
    // Same text, different terminators: a real change.
    let d = diff(b"a\n", b"a\r\n");
    assert!(d.has_changes());

    let d = diff(b"a\r\nb\n", b"a\r\nb\n");
    assert!(!d.has_changes());
}
